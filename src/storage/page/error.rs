use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageError {
    #[error("not enough space in page")]
    InsufficientSpace,
    #[error("tuple not found")]
    TupleNotFound,
    #[error("invalid slot id")]
    InvalidSlot,
    #[error("tuple larger than a page can hold")]
    TupleTooLarge,
}
