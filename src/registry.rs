pub(crate) mod projects;
