mod auth;
mod colleges;
mod programs;
