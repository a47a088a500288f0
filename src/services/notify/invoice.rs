use crate::db::queries::BookingDetails;

fn format_price(amount: i64) -> String {
    // IDR grouping: Rp 75.000
    let digits = amount.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    format!("Rp {grouped}")
}

pub fn invoice_subject(booking: &BookingDetails) -> String {
    let short_id: String = booking.id.chars().take(8).collect();
    format!("Booking Confirmed - Invoice #{short_id}")
}

pub fn render_invoice_html(booking: &BookingDetails) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>CusWash Booking Confirmation</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6;">
    <div style="margin: 0 auto; padding: 20px; max-width: 580px;">
        <h1>Your booking is confirmed</h1>
        <p>Thank you for choosing CusWash. Here are your booking details:</p>
        <table>
            <tr><td>Booking ID</td><td>{id}</td></tr>
            <tr><td>Service</td><td>{car_type}</td></tr>
            <tr><td>Date</td><td>{date}</td></tr>
            <tr><td>Time</td><td>{time}</td></tr>
            <tr><td>Total</td><td>{total}</td></tr>
        </table>
        <p>See you at the wash!</p>
    </div>
</body>
</html>
"#,
        id = booking.id,
        car_type = booking.car_type_name,
        date = booking.booking_date,
        time = booking.slot_time,
        total = format_price(booking.total_price),
    )
}
