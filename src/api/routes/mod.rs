pub mod games;
pub mod plot;
pub mod reference;
