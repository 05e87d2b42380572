mod constraint_tests;
mod transaction_tests;
