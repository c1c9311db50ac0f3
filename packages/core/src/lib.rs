// ABOUTME: Core types, validation rules and update policy for ProfileHub
// ABOUTME: Foundational package with no I/O, shared by storage, media, email and API layers

pub mod constants;
pub mod links;
pub mod pagination;
pub mod policy;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export main types
pub use types::{UserCreate, UserListResponse, UserRecord, UserResponse, UserRole, UserUpdate};

// Re-export utilities
pub use links::{pagination_links, user_links};
pub use pagination::PaginationParams;
pub use utils::generate_nickname;

// Re-export validation
pub use policy::check_at_least_one_value;
pub use validation::{
    validate_email_address, validate_nickname, validate_password_strength, validate_url,
    ValidationError,
};
