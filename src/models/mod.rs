pub mod category;
pub mod user;

pub use category::{Category, CategoryCreateDto, CategoryDto, CategoryUpdateDto, NewCategory};
pub use user::{ApplicationUser, LoginDto, LoginResponse, RegisterDto, UserDto};
