pub mod recommend;

pub use recommend::configure as configure_recommend;
