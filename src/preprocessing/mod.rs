/// Модуль предобработки признаков

pub mod normalization;

pub use normalization::{MinMaxScaler, StandardScaler};
