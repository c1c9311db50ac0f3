// ABOUTME: Hypermedia link maps attached to user responses
// ABOUTME: Builds self/update/picture links and list navigation links

use std::collections::HashMap;

use uuid::Uuid;

use crate::pagination::PaginationParams;

fn trimmed(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}

/// Links for a single user resource
pub fn user_links(base_url: &str, user_id: Uuid) -> HashMap<String, String> {
    let resource = format!("{}/users/{}", trimmed(base_url), user_id);

    let mut links = HashMap::new();
    links.insert("self".to_string(), resource.clone());
    links.insert("update".to_string(), resource.clone());
    links.insert(
        "professional_status".to_string(),
        format!("{}/professional-status", resource),
    );
    links.insert(
        "upload_profile_picture".to_string(),
        format!("{}/upload-profile-picture", resource),
    );
    links
}

/// Navigation links for a page of users
pub fn pagination_links(
    base_url: &str,
    params: &PaginationParams,
    total_items: i64,
) -> HashMap<String, String> {
    let collection = format!("{}/users", trimmed(base_url));
    let limit = params.limit();
    let page = params.page();
    let last = params.total_pages(total_items);
    let page_url = |p: i64| format!("{}?page={}&limit={}", collection, p, limit);

    let mut links = HashMap::new();
    links.insert("self".to_string(), page_url(page));
    links.insert("first".to_string(), page_url(1));
    links.insert("last".to_string(), page_url(last));
    if page > 1 {
        links.insert("prev".to_string(), page_url(page - 1));
    }
    if page < last {
        links.insert("next".to_string(), page_url(page + 1));
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_links() {
        let id = Uuid::new_v4();
        let links = user_links("http://localhost:8000/", id);
        assert_eq!(links["self"], format!("http://localhost:8000/users/{}", id));
        assert_eq!(
            links["upload_profile_picture"],
            format!("http://localhost:8000/users/{}/upload-profile-picture", id)
        );
    }

    #[test]
    fn test_pagination_links_middle_page() {
        let params = PaginationParams::new(2, 10);
        let links = pagination_links("http://api", &params, 35);
        assert_eq!(links["self"], "http://api/users?page=2&limit=10");
        assert_eq!(links["prev"], "http://api/users?page=1&limit=10");
        assert_eq!(links["next"], "http://api/users?page=3&limit=10");
        assert_eq!(links["last"], "http://api/users?page=4&limit=10");
    }

    #[test]
    fn test_pagination_links_past_the_end() {
        let params = PaginationParams::new(i64::MAX, 10);
        let links = pagination_links("http://api", &params, 35);
        assert!(!links.contains_key("next"));
        assert_eq!(
            links["prev"],
            format!("http://api/users?page={}&limit=10", i64::MAX - 1)
        );
        assert_eq!(links["last"], "http://api/users?page=4&limit=10");
    }

    #[test]
    fn test_pagination_links_single_page() {
        let params = PaginationParams::default();
        let links = pagination_links("http://api", &params, 3);
        assert!(!links.contains_key("prev"));
        assert!(!links.contains_key("next"));
        assert_eq!(links["first"], links["last"]);
    }
}
