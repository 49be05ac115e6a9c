//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    CreateMicropostRequest, EmailQuery, FollowRequest, LoginRequest, PasswordResetRequest,
    ResetPasswordRequest, SignupRequest, UpdateUserRequest,
};

pub use responses::{
    AuthResponse, CurrentUserResponse, FollowResponse, HealthChecks, HealthResponse,
    MessageResponse, MicropostResponse, PaginatedResponse, ProfileResponse, ReadinessResponse,
    SignupResponse, UserResponse, AVATAR_SIZE,
};

pub use mappers::ProfileCounts;
