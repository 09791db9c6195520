pub mod receivables;
