//! User registration, login and JWT session handling.

pub mod handlers;
pub mod middleware;
pub mod service;

pub use service::{
    AuthError, AuthResponse, Claims, LoginRequest, RegisterRequest, UpdateProfileRequest,
    UserAuthService, UserProfile,
};
