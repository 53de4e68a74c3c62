pub(crate) mod api;
pub(crate) mod capability;
pub(crate) mod recording;
