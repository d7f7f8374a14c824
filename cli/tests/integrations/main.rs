mod check;
mod demo;
mod run;
mod scan;
mod server;
