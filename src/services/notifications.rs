//! Customer notifications
//!
//! Email bodies for the order lifecycle. All sends are best-effort: errors
//! are logged and swallowed so status changes are never rolled back by a
//! mail outage.

use crate::db::models::{Order, OrderItem};
use crate::services::mailer::Mailer;

/// Order confirmation, sent once payment settles.
pub async fn send_order_confirmation(mailer: &dyn Mailer, order: &Order, items: &[OrderItem]) {
    let subject = format!("Confirmación de pedido #{}", order.numero_pedido);

    let filas: String = items
        .iter()
        .map(|item| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>${}</td></tr>",
                item.nombre, item.cantidad, item.precio
            )
        })
        .collect();

    let body = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h1>¡Gracias por tu compra!</h1>
  <p>Hemos recibido tu pedido #{numero}</p>
  <h2>Resumen del pedido:</h2>
  <table>
    <thead><tr><th>Producto</th><th>Cantidad</th><th>Precio</th></tr></thead>
    <tbody>{filas}</tbody>
  </table>
  <p><strong>Total: ${total}</strong></p>
  <p>Te notificaremos cuando tu pedido sea enviado.</p>
  <p>Gracias por comprar en ModaStyle,<br>El equipo de ModaStyle</p>
</div>"#,
        numero = order.numero_pedido,
        filas = filas,
        total = order.total,
    );

    if let Err(e) = mailer.send(&order.cliente_email, &subject, &body).await {
        tracing::error!(
            pedido = %order.numero_pedido,
            error = %e,
            "failed to send order confirmation email"
        );
    }
}

/// Shipping notification, sent when an order transitions to ENVIADO.
pub async fn send_shipping_notification(mailer: &dyn Mailer, order: &Order) {
    let subject = format!("Tu pedido #{} está en camino", order.numero_pedido);

    let tracking = order
        .tracking_number
        .as_deref()
        .map(|t| format!("<p>Número de guía: <strong>{t}</strong></p>"))
        .unwrap_or_default();

    let body = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h1>¡Tu pedido va en camino!</h1>
  <p>Hola {nombre}, tu pedido #{numero} ha sido enviado.</p>
  {tracking}
  <p>Gracias por comprar en ModaStyle,<br>El equipo de ModaStyle</p>
</div>"#,
        nombre = order.cliente_nombre,
        numero = order.numero_pedido,
        tracking = tracking,
    );

    if let Err(e) = mailer.send(&order.cliente_email, &subject, &body).await {
        tracing::error!(
            pedido = %order.numero_pedido,
            error = %e,
            "failed to send shipping notification email"
        );
    }
}
