pub mod categories;
pub mod pairing;
pub mod performance;
pub mod recommend;
