pub mod admin_handler;
pub mod auth_handler;
pub mod class_handler;
pub mod enrollment_handler;
pub mod health_handler;

pub use admin_handler::{class_lessons, overview};
pub use auth_handler::{login, logout, me, register};
pub use class_handler::{
    create_class, delete_class, list_classes, regenerate_code, remove_student, roster,
};
pub use enrollment_handler::{join_class, leave_class, my_classes};
pub use health_handler::{health_check, health_check_live, health_check_ready};
