pub(crate) mod assembler;
pub(crate) mod content;
pub(crate) mod context;
pub(crate) mod deck;
pub(crate) mod page;
pub(crate) mod session;
