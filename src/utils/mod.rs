pub mod images;

#[cfg(test)]
pub mod test_utils;
