use std::collections::HashSet;
use uuid::Uuid;

const TOKEN_LEN: usize = 8;

/// Issues `REQ-`/`TC-` identifiers that are pairwise distinct within a run.
///
/// Tokens come from v4 UUIDs; a token already issued by this allocator is
/// redrawn.
#[derive(Debug, Default)]
pub struct RecordIdAllocator {
    issued: HashSet<String>,
}

impl RecordIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_requirement_id(&mut self) -> String {
        self.next("REQ")
    }

    pub fn next_test_case_id(&mut self) -> String {
        self.next("TC")
    }

    pub fn issued(&self) -> usize {
        self.issued.len()
    }

    fn next(&mut self, prefix: &str) -> String {
        loop {
            let token = Uuid::new_v4().simple().to_string();
            let id = format!("{}-{}", prefix, token[..TOKEN_LEN].to_uppercase());
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_format() {
        let mut allocator = RecordIdAllocator::new();
        let req = allocator.next_requirement_id();
        let tc = allocator.next_test_case_id();

        assert!(req.starts_with("REQ-"));
        assert_eq!(req.len(), 4 + TOKEN_LEN);
        assert!(tc.starts_with("TC-"));
        assert!(tc[3..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_ids_are_distinct() {
        let mut allocator = RecordIdAllocator::new();
        let ids: HashSet<String> = (0..2_000).map(|_| allocator.next_test_case_id()).collect();
        assert_eq!(ids.len(), 2_000);
        assert_eq!(allocator.issued(), 2_000);
    }
}
