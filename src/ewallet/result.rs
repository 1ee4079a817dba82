/// Catch-all result for the binary glue and file plumbing, where the concrete error type doesn't matter
pub type Result<T = ()> = anyhow::Result<T>;
