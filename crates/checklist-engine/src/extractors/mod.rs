pub mod email;
pub mod numeric;
