//! # Server-Rendered Views
//!
//! Two HTML pages rendered directly from domain data:
//! - `GET /` for the dashboard with aggregate figures and recent invoices
//! - `GET /print/invoice/{id}` for a printable invoice for a customer
//!
//! Pages are assembled with plain string building; everything
//! user-supplied passes through [`escape`] first.

use axum::extract::{Path, State};
use axum::response::Html;
use chrono::NaiveDate;

use billing_core::InvoiceStatus;

use crate::error::ApiResult;
use crate::state::AppState;

/// Currency symbol used across both views.
const CURRENCY: &str = "\u{20B9}";

// =============================================================================
// Dashboard
// =============================================================================

pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let stats = state.db.stats().dashboard().await?;

    let mut recent_rows = String::new();
    for summary in &stats.recent_invoices {
        let inv = &summary.invoice;
        recent_rows.push_str(&format!(
            "<tr>\
             <td><a href=\"/print/invoice/{id}\">{number}</a></td>\
             <td>{customer}</td>\
             <td>{date}</td>\
             <td class=\"num\">{cur}{total}</td>\
             <td class=\"num\">{cur}{balance}</td>\
             <td>{status}</td>\
             </tr>",
            id = inv.id,
            number = escape(&inv.invoice_number),
            customer = escape(&summary.customer_name),
            date = format_date(inv.invoice_date),
            cur = CURRENCY,
            total = inv.total_amount,
            balance = inv.balance_amount,
            status = status_badge(inv.status),
        ));
    }
    if stats.recent_invoices.is_empty() {
        recent_rows.push_str("<tr><td colspan=\"6\" class=\"empty\">No invoices yet</td></tr>");
    }

    let body = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{company} · Dashboard</title>
<style>
body {{ font-family: system-ui, sans-serif; margin: 2rem; color: #1a1a2e; }}
h1 {{ margin-bottom: 0.25rem; }}
.cards {{ display: flex; gap: 1rem; flex-wrap: wrap; margin: 1.5rem 0; }}
.card {{ border: 1px solid #d0d0e0; border-radius: 8px; padding: 1rem 1.5rem; min-width: 150px; }}
.card .label {{ font-size: 0.8rem; color: #666; text-transform: uppercase; }}
.card .value {{ font-size: 1.6rem; font-weight: 600; }}
table {{ border-collapse: collapse; width: 100%; }}
th, td {{ text-align: left; padding: 0.5rem 0.75rem; border-bottom: 1px solid #e0e0ee; }}
td.num {{ text-align: right; font-variant-numeric: tabular-nums; }}
td.empty {{ color: #888; text-align: center; padding: 1.5rem; }}
.badge {{ padding: 0.15rem 0.5rem; border-radius: 4px; font-size: 0.8rem; }}
.badge.paid {{ background: #d9f2e1; color: #1a7a3e; }}
.badge.partial {{ background: #fdf0d5; color: #a1680b; }}
.badge.pending {{ background: #fbdcdc; color: #a12525; }}
</style>
</head>
<body>
<h1>{company}</h1>
<p>Billing dashboard</p>
<div class="cards">
  <div class="card"><div class="label">Customers</div><div class="value">{customers}</div></div>
  <div class="card"><div class="label">Products</div><div class="value">{products}</div></div>
  <div class="card"><div class="label">Invoices</div><div class="value">{invoices}</div></div>
  <div class="card"><div class="label">Open</div><div class="value">{pending}</div></div>
  <div class="card"><div class="label">Revenue</div><div class="value">{cur}{revenue}</div></div>
  <div class="card"><div class="label">Collected</div><div class="value">{cur}{paid}</div></div>
  <div class="card"><div class="label">Outstanding</div><div class="value">{cur}{outstanding}</div></div>
</div>
<h2>Recent invoices</h2>
<table>
<thead><tr><th>Number</th><th>Customer</th><th>Date</th><th>Total</th><th>Balance</th><th>Status</th></tr></thead>
<tbody>{recent_rows}</tbody>
</table>
</body>
</html>"#,
        company = escape(&state.config.company_name),
        customers = stats.total_customers,
        products = stats.total_products,
        invoices = stats.total_invoices,
        pending = stats.pending_invoices,
        cur = CURRENCY,
        revenue = stats.total_revenue,
        paid = stats.total_paid,
        outstanding = stats.total_outstanding,
        recent_rows = recent_rows,
    );

    Ok(Html(body))
}

// =============================================================================
// Printable Invoice
// =============================================================================

pub async fn print_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Html<String>> {
    let detail = state.db.invoices().get_detail(id).await?;
    let inv = &detail.invoice;
    let config = &state.config;

    let mut item_rows = String::new();
    for (index, item_detail) in detail.items.iter().enumerate() {
        let item = &item_detail.item;
        let name = item
            .description
            .as_deref()
            .or(item_detail.product_name.as_deref())
            .unwrap_or("Item");
        item_rows.push_str(&format!(
            "<tr>\
             <td>{n}</td>\
             <td>{name}</td>\
             <td class=\"num\">{qty}</td>\
             <td class=\"num\">{cur}{price}</td>\
             <td class=\"num\">{cur}{total}</td>\
             </tr>",
            n = index + 1,
            name = escape(name),
            qty = item.quantity,
            cur = CURRENCY,
            price = item.unit_price,
            total = item.line_total,
        ));
    }

    let discount_row = if inv.discount_amount.is_positive() {
        format!(
            "<tr><td>Discount</td><td class=\"num\">&minus;{cur}{amount}</td></tr>",
            cur = CURRENCY,
            amount = inv.discount_amount,
        )
    } else {
        String::new()
    };

    let due_row = match inv.due_date {
        Some(due) => format!("<p>Due date: {}</p>", format_date(due)),
        None => String::new(),
    };

    let notes_block = match inv.notes.as_deref() {
        Some(notes) if !notes.trim().is_empty() => {
            format!("<h3>Notes</h3><p>{}</p>", escape(notes))
        }
        _ => String::new(),
    };

    let customer = &detail.customer;
    let customer_lines = [
        customer.business_name.as_deref(),
        customer.address.as_deref(),
        customer.city.as_deref(),
        customer.phone.as_deref(),
        customer.tax_id.as_deref(),
    ]
    .iter()
    .flatten()
    .map(|line| escape(line))
    .collect::<Vec<_>>()
    .join("<br>");

    let body = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Invoice {number}</title>
<style>
body {{ font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 760px; color: #111; }}
header {{ display: flex; justify-content: space-between; border-bottom: 2px solid #111; padding-bottom: 1rem; }}
h1 {{ margin: 0; font-size: 1.4rem; }}
.meta {{ text-align: right; }}
table.items {{ border-collapse: collapse; width: 100%; margin-top: 1.5rem; }}
table.items th, table.items td {{ border: 1px solid #ccc; padding: 0.4rem 0.6rem; }}
table.items th {{ background: #f4f4f8; text-align: left; }}
td.num {{ text-align: right; font-variant-numeric: tabular-nums; }}
table.totals {{ margin-left: auto; margin-top: 1rem; }}
table.totals td {{ padding: 0.2rem 0.75rem; }}
table.totals td.num {{ min-width: 7rem; }}
.grand td {{ font-weight: 700; border-top: 1px solid #111; }}
.status {{ text-transform: uppercase; letter-spacing: 0.05em; }}
@media print {{ body {{ margin: 0; }} }}
</style>
</head>
<body>
<header>
  <div>
    <h1>{company}</h1>
    <p>{address}<br>{phone}<br>{email}</p>
  </div>
  <div class="meta">
    <h1>INVOICE</h1>
    <p>{number}<br>Date: {date}</p>
    {due_row}
    <p class="status">{status}</p>
  </div>
</header>
<h3>Bill to</h3>
<p><strong>{customer_name}</strong><br>{customer_lines}</p>
<table class="items">
<thead><tr><th>#</th><th>Item</th><th>Qty</th><th>Unit price</th><th>Amount</th></tr></thead>
<tbody>{item_rows}</tbody>
</table>
<table class="totals">
<tr><td>Subtotal</td><td class="num">{cur}{subtotal}</td></tr>
{discount_row}
<tr class="grand"><td>Total</td><td class="num">{cur}{total}</td></tr>
<tr><td>Paid</td><td class="num">{cur}{paid}</td></tr>
<tr><td>Balance due</td><td class="num">{cur}{balance}</td></tr>
</table>
{notes_block}
</body>
</html>"#,
        number = escape(&inv.invoice_number),
        company = escape(&config.company_name),
        address = escape(&config.company_address),
        phone = escape(&config.company_phone),
        email = escape(&config.company_email),
        date = format_date(inv.invoice_date),
        due_row = due_row,
        status = status_label(inv.status),
        customer_name = escape(&customer.name),
        customer_lines = customer_lines,
        item_rows = item_rows,
        cur = CURRENCY,
        subtotal = inv.subtotal,
        discount_row = discount_row,
        total = inv.total_amount,
        paid = inv.paid_amount,
        balance = inv.balance_amount,
    );

    Ok(Html(body))
}

// =============================================================================
// Helpers
// =============================================================================

/// Escapes HTML-significant characters in user-supplied text.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn format_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

fn status_label(status: InvoiceStatus) -> &'static str {
    match status {
        InvoiceStatus::Pending => "Pending",
        InvoiceStatus::Partial => "Partially paid",
        InvoiceStatus::Paid => "Paid",
    }
}

fn status_badge(status: InvoiceStatus) -> String {
    let class = match status {
        InvoiceStatus::Pending => "pending",
        InvoiceStatus::Partial => "partial",
        InvoiceStatus::Paid => "paid",
    };
    format!(
        "<span class=\"badge {class}\">{label}</span>",
        label = status_label(status)
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_neutralizes_markup() {
        assert_eq!(
            escape("<script>alert('x')</script>"),
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"
        );
        assert_eq!(escape("A & B \"Co\""), "A &amp; B &quot;Co&quot;");
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        assert_eq!(format_date(date), "25 Aug 2026");
    }

    #[test]
    fn test_status_badge_classes() {
        assert!(status_badge(InvoiceStatus::Paid).contains("badge paid"));
        assert!(status_badge(InvoiceStatus::Partial).contains("Partially paid"));
    }
}
