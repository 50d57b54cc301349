//! CSV input of expenses and CSV/text output of reports.

pub mod expense_reader;
pub mod report_writer;
