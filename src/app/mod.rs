pub mod ports;
pub mod load_use_case;
pub mod generate_use_case;
