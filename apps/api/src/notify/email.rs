//! Confirmation email sent to a candidate once their application has been scored.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmationEmail {
    pub to: String,
    pub candidate_name: String,
    pub job_title: String,
    pub company_name: String,
    /// Overall score, 0–100.
    pub score: u8,
}

impl ConfirmationEmail {
    pub fn subject(&self) -> String {
        format!("Application received - {}", self.job_title)
    }

    pub fn text_body(&self) -> String {
        format!(
            "Application received!\n\
             \n\
             Hi {name},\n\
             \n\
             We have received your application for the position of:\n\
             {title} at {company}\n\
             \n\
             Your profile was evaluated by our AI screening and scored {score}/100.\n\
             \n\
             Our recruiting team will review your application and contact you soon \
             if your profile is selected for the next stage.\n\
             \n\
             Good luck!\n",
            name = self.candidate_name,
            title = self.job_title,
            company = self.company_name,
            score = self.score,
        )
    }

    pub fn html_body(&self) -> String {
        let name = escape_html(&self.candidate_name);
        let title = escape_html(&self.job_title);
        let company = escape_html(&self.company_name);
        let score = self.score;

        format!(
            r#"<html>
  <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
      <h2 style="color: #2563eb;">Application received!</h2>
      <p>Hi <strong>{name}</strong>,</p>
      <p>We have received your application for the position of:</p>
      <div style="background-color: #f3f4f6; padding: 15px; border-radius: 8px; margin: 20px 0;">
        <h3 style="margin: 0; color: #1f2937;">{title}</h3>
        <p style="margin: 5px 0; color: #6b7280;">at {company}</p>
      </div>
      <p>Your profile was evaluated by our AI screening and scored <strong>{score}/100</strong>.</p>
      <p>Our recruiting team will review your application and contact you soon if your profile is selected for the next stage.</p>
      <p style="margin-top: 30px;">Good luck!</p>
      <hr style="border: none; border-top: 1px solid #e5e7eb; margin: 30px 0;">
      <p style="font-size: 12px; color: #6b7280;">This is an automated message, please do not reply.</p>
    </div>
  </body>
</html>"#
        )
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> ConfirmationEmail {
        ConfirmationEmail {
            to: "ana@example.com".to_string(),
            candidate_name: "Ana <Dev>".to_string(),
            job_title: "Backend Engineer".to_string(),
            company_name: "Acme & Co".to_string(),
            score: 82,
        }
    }

    #[test]
    fn test_subject_names_the_job() {
        assert_eq!(email().subject(), "Application received - Backend Engineer");
    }

    #[test]
    fn test_text_body_contains_details() {
        let body = email().text_body();
        assert!(body.contains("Hi Ana <Dev>,"));
        assert!(body.contains("Backend Engineer at Acme & Co"));
        assert!(body.contains("82/100"));
    }

    #[test]
    fn test_html_body_escapes_user_text() {
        let html = email().html_body();
        assert!(html.contains("Ana &lt;Dev&gt;"));
        assert!(html.contains("at Acme &amp; Co"));
        assert!(html.contains("<strong>82/100</strong>"));
        assert!(!html.contains("<Dev>"));
    }
}
