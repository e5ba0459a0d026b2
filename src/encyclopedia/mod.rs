pub mod compose;
pub mod crosslink;
pub mod normalize;
pub mod reference;
pub mod supplementary;
