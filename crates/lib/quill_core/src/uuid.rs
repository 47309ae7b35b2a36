// Chats and messages are listed in creation order, so their ids are UUIDv7
// generated app-side. PostgreSQL has no native v7 default.

use uuid::Uuid;

/// Generate a new UUIDv7 (timestamp-sortable).
pub fn uuidv7() -> Uuid {
    Uuid::now_v7()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuidv7_is_valid() {
        let id = uuidv7();
        assert_eq!(id.get_version(), Some(uuid::Version::SortRand));
    }

    #[test]
    fn uuidv7_sorts_by_creation() {
        let a = uuidv7();
        let b = uuidv7();
        assert!(b >= a);
    }
}
