// Application layer: presentation of computed reports.

pub mod presenter;
