//! Signal conditioning shared by the controllers.

pub mod lag;
