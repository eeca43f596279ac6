pub mod formations;
pub mod gestures;
pub mod mapping;
pub mod morph;
pub mod particles;
