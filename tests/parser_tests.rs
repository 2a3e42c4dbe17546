//! Integration tests for invoice text parsing.

use invoice_rag::parse_invoice;

const FULL_INVOICE: &str = "Invoice: 12345\n\
Date: 3/1/2024\n\
Customer: Acme Corp\n\
Vehicle: 2020 Ford F-150\n\
VIN: 1FT1234567890\n\
Complaint: Won't start\n\
Cause: Dead battery\n\
Correction: Replaced battery\n\
Labor: 0.5 hrs @ $100\n\
Parts: Battery";

#[test]
fn parses_complete_invoice() {
    let record = parse_invoice(FULL_INVOICE, "inv_12345.pdf").unwrap();

    assert_eq!(record.invoice_id, "12345");
    assert_eq!(record.date.as_deref(), Some("3/1/2024"));
    assert_eq!(record.customer_name.as_deref(), Some("Acme Corp"));
    assert_eq!(record.customer_email, None);
    assert_eq!(record.vehicle.year.as_deref(), Some("2020"));
    assert_eq!(record.vehicle.make.as_deref(), Some("Ford"));
    assert_eq!(record.vehicle.model.as_deref(), Some("F-150"));
    assert_eq!(record.vehicle.vin.as_deref(), Some("1FT1234567890"));
    assert_eq!(record.vehicle.mileage, None);
    assert_eq!(record.document_name, "inv_12345.pdf");

    assert_eq!(record.repair_entries.len(), 1);
    let entry = &record.repair_entries[0];
    assert_eq!(entry.complaint.as_deref(), Some("Won't start"));
    assert_eq!(entry.cause.as_deref(), Some("Dead battery"));
    assert_eq!(entry.correction.as_deref(), Some("Replaced battery"));
    assert_eq!(entry.labor_hours, Some(0.5));
    assert_eq!(entry.labor_rate, Some(100.0));
    assert_eq!(entry.parts, vec!["Battery"]);
}

#[test]
fn parsing_is_idempotent() {
    let first = parse_invoice(FULL_INVOICE, "inv.pdf").unwrap();
    let second = parse_invoice(FULL_INVOICE, "inv.pdf").unwrap();
    assert_eq!(first, second);
}

#[test]
fn document_without_invoice_id_yields_no_record() {
    assert!(parse_invoice("Receipt\nTotal: $40\nThanks!", "receipt.pdf").is_none());
    assert!(parse_invoice("", "empty.pdf").is_none());
}

#[test]
fn header_labels_are_case_sensitive() {
    // The invoice dialect emits exact header casing; a lowercased label is
    // not recognized, so this document has no identifier at all.
    assert!(parse_invoice("invoice: 99999\nComplaint: Noise", "lower.pdf").is_none());
}

#[test]
fn missing_header_fields_are_left_absent() {
    let record = parse_invoice("Invoice: 777\nComplaint: Flat tire", "sparse.pdf").unwrap();
    assert_eq!(record.invoice_id, "777");
    assert_eq!(record.date, None);
    assert_eq!(record.customer_name, None);
    assert_eq!(record.vehicle.year, None);
    assert_eq!(record.vehicle.vin, None);
    assert_eq!(record.repair_entries.len(), 1);
}

#[test]
fn customer_line_with_email_is_split() {
    let text = "Invoice: 88\nCustomer: Jane Dao jane.dao@fleetmail.com\nComplaint: Leak";
    let record = parse_invoice(text, "inv.pdf").unwrap();
    assert_eq!(record.customer_name.as_deref(), Some("Jane Dao jane.dao"));
    assert_eq!(record.customer_email.as_deref(), Some("Jane Dao jane.dao@fleetmail.com"));
}

#[test]
fn mileage_keeps_thousands_separators() {
    let text = "Invoice: 55\nMileage: 210,450\nComplaint: Brakes grind";
    let record = parse_invoice(text, "inv.pdf").unwrap();
    assert_eq!(record.vehicle.mileage.as_deref(), Some("210,450"));
}

#[test]
fn service_block_markers_partition_entries() {
    let text = "Invoice: 321\n\
Date: 5/6/2024\n\
Service Block 1:\n\
Complaint: Overheating\n\
Cause: Stuck thermostat\n\
Correction: Replaced thermostat\n\
Service Block 2:\n\
Complaint: Check engine light\n\
Cause: Faulty O2 sensor\n\
Correction: Replaced sensor\n\
Parts: O2 sensor\n";
    let record = parse_invoice(text, "inv.pdf").unwrap();
    assert_eq!(record.repair_entries.len(), 2);
    assert_eq!(record.repair_entries[0].complaint.as_deref(), Some("Overheating"));
    assert_eq!(record.repair_entries[1].parts, vec!["O2 sensor"]);
}

#[test]
fn header_preamble_is_not_a_repair_entry() {
    // Nothing before the first boundary may leak into an entry, even text
    // that mentions recognized labels lowercase mid-sentence.
    let text = "Invoice: 444\n\
Summary of causes below.\n\
Complaint: Dead battery\n\
Correction: Replaced battery";
    let record = parse_invoice(text, "inv.pdf").unwrap();
    assert_eq!(record.repair_entries.len(), 1);
    assert_eq!(record.repair_entries[0].complaint.as_deref(), Some("Dead battery"));
    assert_eq!(record.repair_entries[0].cause, None);
}

#[test]
fn field_values_absorb_continuation_lines() {
    let text = "Invoice: 999\n\
Complaint: Intermittent stalling\n\
worse when cold\n\
and under load\n\
Cause: Failing fuel pump\n\
Correction: Replaced pump";
    let record = parse_invoice(text, "inv.pdf").unwrap();
    let entry = &record.repair_entries[0];
    assert_eq!(
        entry.complaint.as_deref(),
        Some("Intermittent stalling\nworse when cold\nand under load")
    );
    assert_eq!(entry.cause.as_deref(), Some("Failing fuel pump"));
}

#[test]
fn parts_split_on_commas_and_newlines() {
    let text = "Invoice: 12\n\
Complaint: Rough idle\n\
Parts: Spark plugs, Ignition coil\n\
Air filter";
    let record = parse_invoice(text, "inv.pdf").unwrap();
    assert_eq!(record.repair_entries[0].parts, vec!["Spark plugs", "Ignition coil", "Air filter"]);
}

#[test]
fn labor_rate_is_optional() {
    let text = "Invoice: 13\nComplaint: Squeal\nLabor: 2 hrs";
    let record = parse_invoice(text, "inv.pdf").unwrap();
    assert_eq!(record.repair_entries[0].labor_hours, Some(2.0));
    assert_eq!(record.repair_entries[0].labor_rate, None);
}

#[test]
fn entry_with_only_labor_and_parts_is_dropped() {
    let text = "Invoice: 14\n\
Complaint: Misfire\n\
Cause: Bad coil\n\
Service Block 2:\n\
Labor: 1 hr @ $95\n\
Parts: Shop supplies";
    let record = parse_invoice(text, "inv.pdf").unwrap();
    assert_eq!(record.repair_entries.len(), 1);
}

#[test]
fn invoice_with_no_repair_entries_still_parses() {
    let record = parse_invoice("Invoice: 15\nDate: 1/2/2024", "inv.pdf").unwrap();
    assert!(record.repair_entries.is_empty());
}

#[test]
fn windows_line_endings_are_normalized() {
    let text = "Invoice: 16\r\nDate: 2/3/2024\r\nComplaint: Wobble\r\nCause: Bent rim\r\n";
    let record = parse_invoice(text, "inv.pdf").unwrap();
    assert_eq!(record.date.as_deref(), Some("2/3/2024"));
    assert_eq!(record.repair_entries[0].cause.as_deref(), Some("Bent rim"));
}
