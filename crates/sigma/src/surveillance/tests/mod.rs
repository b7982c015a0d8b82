mod common;
mod completeness;
mod report;
