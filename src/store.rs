pub(crate) mod artifacts;
