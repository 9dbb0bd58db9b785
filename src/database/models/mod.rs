pub mod bootcamp;
pub mod course;
pub mod review;
pub mod user;

pub use bootcamp::{Bootcamp, Career, CreateBootcamp, UpdateBootcamp};
pub use course::{Course, CreateCourse, MinimumSkill, UpdateCourse};
pub use review::{CreateReview, Review, UpdateReview};
pub use user::{CreateUser, LoginRequest, RegisterUser, Role, UpdateDetails, UpdatePassword, UpdateUser, User};
