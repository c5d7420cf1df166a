//! Customer directory loading.
//!
//! The directory is a comma-separated file with `org_id`, `org_name` and
//! `strategic` columns. It backs org-name resolution in the reports and the
//! name-pattern exclusion set, so org-id uniqueness is enforced at load
//! time: a duplicate would make downstream name resolution ambiguous.

use std::collections::HashSet;
use std::io::BufRead;
use std::path::Path;

use metrics_core::models::Customer;
use metrics_core::{MetricsError, Result};

/// Read the customer directory at `path`.
///
/// Fails on a missing required column, a row with the wrong number of
/// fields, or a duplicated org id.
pub fn read_customers(path: &Path) -> Result<Vec<Customer>> {
    let file = std::fs::File::open(path).map_err(|source| MetricsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_customers(std::io::BufReader::new(file))
}

/// Parse the directory from any buffered reader.
pub fn parse_customers<R: BufRead>(input: R) -> Result<Vec<Customer>> {
    let mut lines = input.lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => return Ok(Vec::new()),
    };
    let names: Vec<&str> = header.split(',').map(str::trim).collect();
    let find = |name: &str| {
        names
            .iter()
            .position(|n| *n == name)
            .ok_or_else(|| MetricsError::Config(format!("customer directory has no {} column", name)))
    };
    let org_id_idx = find("org_id")?;
    let org_name_idx = find("org_name")?;
    let strategic_idx = find("strategic")?;

    let mut customers = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (offset, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != names.len() {
            return Err(MetricsError::CustomerRow {
                line: offset + 2,
                expected: names.len(),
                found: fields.len(),
            });
        }

        let org_id = fields[org_id_idx].to_string();
        if !seen.insert(org_id.clone()) {
            let count = customers
                .iter()
                .filter(|c: &&Customer| c.org_id == org_id)
                .count()
                + 1;
            return Err(MetricsError::DuplicateOrgId { org_id, count });
        }

        customers.push(Customer {
            org_id,
            org_name: fields[org_name_idx].to_string(),
            strategic: fields[strategic_idx].to_string(),
        });
    }

    Ok(customers)
}

/// Resolve an org id to its directory name, if present.
pub fn org_name<'a>(customers: &'a [Customer], org_id: &str) -> Option<&'a str> {
    customers
        .iter()
        .find(|c| c.org_id == org_id)
        .map(|c| c.org_name.as_str())
}
