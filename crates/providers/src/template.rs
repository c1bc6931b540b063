use stockwatch_core::ports::Notification;
use tera::{Context, Tera};

const AVAILABILITY_TEMPLATE_NAME: &str = "availability.html";

const AVAILABILITY_TEMPLATE: &str = r#"<html>
    <body style="font-family: Arial, sans-serif; padding: 20px;">
        <h2 style="color: #2c3e50;">Han habilitado la Malta</h2>
        <p><strong>{{ product_name }}</strong> ya está disponible en la tienda.</p>
        <p><a href="{{ catalog_url }}" style="background-color: #3498db; color: white; padding: 10px 20px; text-decoration: none; border-radius: 5px; display: inline-block;">Ver catálogo</a></p>
        <p style="color: #7f8c8d; font-size: 12px;">Hora de ejecución: {{ executed_at }}</p>
    </body>
</html>
"#;

/// Availability email, compiled once when the notifier is built.
#[derive(Clone)]
pub struct EmailTemplate {
    tera: Tera,
}

impl EmailTemplate {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template(AVAILABILITY_TEMPLATE_NAME, AVAILABILITY_TEMPLATE)?;
        Ok(Self { tera })
    }

    pub fn subject(product_name: &str) -> String {
        format!(" {product_name} ya está disponible!")
    }

    pub fn render(&self, notification: &Notification) -> Result<String, tera::Error> {
        let mut context = Context::new();
        context.insert("product_name", &notification.product_name);
        context.insert("catalog_url", &notification.catalog_url);
        context.insert(
            "executed_at",
            &notification.triggered_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        );
        self.tera.render(AVAILABILITY_TEMPLATE_NAME, &context)
    }
}
