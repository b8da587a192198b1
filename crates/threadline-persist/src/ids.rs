use uuid::Uuid;

/// Message ids are UUIDv7 strings, so lexicographic order follows creation order.
pub fn new_message_id() -> String {
    Uuid::now_v7().to_string()
}

pub fn new_thread_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_ids_sort_in_creation_order() {
        let ids: Vec<String> = (0..64).map(|_| new_message_id()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn thread_ids_are_unique() {
        assert_ne!(new_thread_id(), new_thread_id());
    }
}
