
mod content;
mod creators;
mod errors;
mod fans;
