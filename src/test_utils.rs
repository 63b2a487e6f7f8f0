use crate::models::domain::{Class, Role, User};
