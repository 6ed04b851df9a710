use super::{input_field, link};

pub fn login_page(email: &str) -> String {
    format!(
        "<h1>Login</h1>\n<form action=\"/login\" method=\"post\">\n{}{}\
         <div class=\"actions\"><button type=\"submit\">Login</button></div>\n</form>\n<p>{}</p>\n",
        input_field("email", "email", "Email", "email", email),
        input_field("password", "password", "Password", "password", ""),
        link("Sign up", "/sign_up"),
    )
}
