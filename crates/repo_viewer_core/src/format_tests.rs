use super::*;

#[test]
fn test_zero_bytes() {
    assert_eq!(format_file_size(0), "0 Bytes");
}

#[test]
fn test_small_values_stay_in_bytes() {
    assert_eq!(format_file_size(1), "1 Bytes");
    assert_eq!(format_file_size(1023), "1023 Bytes");
}

#[test]
fn test_unit_boundaries() {
    assert_eq!(format_file_size(1024), "1 KB");
    assert_eq!(format_file_size(1024 * 1024), "1 MB");
    assert_eq!(format_file_size(1024 * 1024 * 1024), "1 GB");
}

#[test]
fn test_fractional_values_keep_two_decimals() {
    assert_eq!(format_file_size(1536), "1.5 KB");
    assert_eq!(format_file_size(1234567), "1.18 MB");
}

#[test]
fn test_terabytes_stay_in_gigabytes() {
    assert_eq!(format_file_size(2 * 1024 * 1024 * 1024 * 1024), "2048 GB");
}
