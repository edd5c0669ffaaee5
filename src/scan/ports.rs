use super::services::SERVICES;
use super::ScanError;

/// Parses a port selection such as `22,80,8000-8090`. Items are separated by
/// commas, each item is a single port or an inclusive `low-high` range, and
/// whitespace around items is ignored.
pub fn parse_selection(selection: &str) -> Result<Vec<u16>, ScanError> {
    let mut ports = Vec::new();
    for item in selection.split(',') {
        let item = item.trim();
        if let Some((low, high)) = item.split_once('-') {
            if low.contains('-') || high.contains('-') {
                return Err(ScanError::InvalidPortSegment(item.to_string()));
            }
            let low: u16 = low
                .trim()
                .parse()
                .map_err(|_| ScanError::InvalidPortNumber(low.trim().to_string()))?;
            let high: u16 = high
                .trim()
                .parse()
                .map_err(|_| ScanError::InvalidPortNumber(high.trim().to_string()))?;
            if low > high {
                return Err(ScanError::InvalidPortRange(low, high));
            }
            ports.extend(low..=high);
        } else {
            let port = item
                .parse()
                .map_err(|_| ScanError::InvalidPortNumber(item.to_string()))?;
            ports.push(port);
        }
    }
    Ok(ports)
}

/// The built-in scan set: every port in the service-name table.
pub fn default_ports() -> Vec<u16> {
    SERVICES.iter().map(|entry| entry.0).collect()
}
