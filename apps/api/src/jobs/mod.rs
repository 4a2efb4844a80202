// Public job board: published postings and job detail.

pub mod handlers;
