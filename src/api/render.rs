//! Minimal server-side page rendering
//!
//! Pages carry their data as plain semantic HTML. Styling and layout
//! are intentionally out of scope.

use crate::models::{format_date_short, format_timestamp, Conversation, Item, Person, User};
use crate::validate::{CaregiverRelationship, Relation};
use axum::response::Html;
use std::fmt::Write as _;

/// Escape text for interpolation into HTML
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

/// Submit handler shared by every `data-json` form: field values are
/// serialized to JSON (dotted names nest, file inputs become data URLs)
/// and posted to the form's action. On success the browser follows the
/// `redirect` in the response or the form's `data-done` target; on
/// failure the `error` message lands in the form's alert element.
const SUBMIT_SCRIPT: &str = r#"<script>
function readAsDataUrl(file) {
  return new Promise((resolve, reject) => {
    const reader = new FileReader();
    reader.onload = () => resolve(reader.result);
    reader.onerror = () => reject(reader.error);
    reader.readAsDataURL(file);
  });
}
function assign(data, name, value) {
  const parts = name.split('.');
  let obj = data;
  for (let i = 0; i < parts.length - 1; i += 1) {
    obj = obj[parts[i]] = obj[parts[i]] || {};
  }
  obj[parts[parts.length - 1]] = value;
}
for (const form of document.querySelectorAll('form[data-json]')) {
  form.addEventListener('submit', async (event) => {
    event.preventDefault();
    const data = {};
    for (const el of form.elements) {
      if (!el.name) continue;
      const value = el.type === 'file'
        ? (el.files[0] ? await readAsDataUrl(el.files[0]) : '')
        : el.value;
      assign(data, el.name, value);
    }
    const response = await fetch(form.getAttribute('action'), {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(data),
    });
    const body = await response.json().catch(() => ({}));
    if (response.ok) {
      window.location.assign(body.redirect || form.dataset.done || '/');
    } else {
      const alert = form.querySelector('[role=alert]');
      if (alert) alert.textContent = body.error || 'Request failed';
    }
  });
}
</script>"#;

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{} – Memento</title>\n</head>\n<body>\n{}\n{}\n</body>\n</html>\n",
        escape(title),
        body,
        SUBMIT_SCRIPT
    ))
}

pub fn landing() -> Html<String> {
    page(
        "Welcome",
        "<main>\n<h1>Memento</h1>\n\
         <p>Record the people and conversations that matter, and find them again.</p>\n\
         <nav><a href=\"/login\">Login</a> <a href=\"/signup\">Sign Up</a></nav>\n</main>",
    )
}

pub fn login_form() -> Html<String> {
    page(
        "Login",
        "<main>\n<h1>Welcome back</h1>\n\
         <form method=\"post\" action=\"/api/login\" data-json>\n\
         <label>Email <input type=\"email\" name=\"email\" required></label>\n\
         <label>Password <input type=\"password\" name=\"password\" required></label>\n\
         <p role=\"alert\"></p>\n\
         <button type=\"submit\">Login</button>\n</form>\n\
         <p>Don't have an account? <a href=\"/signup\">Sign up</a></p>\n</main>",
    )
}

pub fn signup_form() -> Html<String> {
    let mut options = String::new();
    for relationship in CaregiverRelationship::ALL {
        let _ = write!(
            options,
            "<option value=\"{}\">{}</option>",
            relationship.as_str(),
            relationship.label()
        );
    }

    let body = format!(
        "<main>\n<h1>Welcome</h1>\n<p>Create a new account to get started</p>\n\
         <form method=\"post\" action=\"/api/signup\" data-json>\n\
         <label>Name <input type=\"text\" name=\"name\" required></label>\n\
         <label>Email <input type=\"email\" name=\"email\" required></label>\n\
         <label>Password <input type=\"password\" name=\"password\" minlength=\"6\" required></label>\n\
         <label>Timezone <input type=\"text\" name=\"timezone\" placeholder=\"Auto-detected\" required></label>\n\
         <label>Profile Image (Optional) <input type=\"file\" name=\"profileImage\" accept=\"image/*\"></label>\n\
         <fieldset>\n<legend>Primary Caregiver Information</legend>\n\
         <label>Caregiver Name <input type=\"text\" name=\"primaryCaregiver.name\" required></label>\n\
         <label>Relationship <select name=\"primaryCaregiver.relationship\" required>{options}</select></label>\n\
         <label>Contact Information <input type=\"text\" name=\"primaryCaregiver.contact\" placeholder=\"Phone or email\" required></label>\n\
         </fieldset>\n\
         <p role=\"alert\"></p>\n\
         <button type=\"submit\">Sign Up</button>\n</form>\n\
         <p>Already have an account? <a href=\"/login\">Login</a></p>\n</main>"
    );
    page("Sign Up", &body)
}

pub fn dashboard(user: &User, items: &[Item]) -> Html<String> {
    let mut body = String::new();
    let _ = write!(
        body,
        "<nav><h1>Welcome, {}</h1> <a href=\"/people\">People</a> \
         <a href=\"/conversations\">Conversations</a> <a href=\"/profile\">Profile</a> \
         <form method=\"post\" action=\"/api/logout\" data-json><button type=\"submit\">Logout</button></form></nav>\n",
        escape(&user.name)
    );

    body.push_str("<section>\n<h2>Items</h2>\n");
    if items.is_empty() {
        body.push_str("<p>No items yet. Create your first item to get started!</p>\n");
    } else {
        body.push_str("<ul>\n");
        for item in items {
            let _ = write!(
                body,
                "<li id=\"item-{}\"><h3>{}</h3><p>{}</p></li>\n",
                escape(&item.id),
                escape(&item.title),
                escape(&item.description)
            );
        }
        body.push_str("</ul>\n");
    }
    body.push_str("</section>\n");

    body.push_str("<section>\n<h2>User Profile</h2>\n<dl>\n");
    let _ = write!(body, "<dt>Name</dt><dd>{}</dd>\n", escape(&user.name));
    let _ = write!(body, "<dt>Email</dt><dd>{}</dd>\n", escape(&user.email));
    let _ = write!(
        body,
        "<dt>Timezone</dt><dd>{}</dd>\n",
        escape(user.timezone.as_deref().unwrap_or("Not set"))
    );
    body.push_str("</dl>\n");
    if let Some(caregiver) = &user.primary_caregiver {
        let _ = write!(
            body,
            "<h3>Primary Caregiver</h3>\n<dl>\n\
             <dt>Name</dt><dd>{}</dd>\n<dt>Relationship</dt><dd>{}</dd>\n\
             <dt>Contact</dt><dd>{}</dd>\n</dl>\n",
            escape(&caregiver.name),
            escape(&caregiver.relationship),
            escape(&caregiver.contact)
        );
    }
    body.push_str("</section>");

    page("Dashboard", &body)
}

pub fn profile(user: &User) -> Html<String> {
    let mut body = String::new();
    body.push_str("<nav><a href=\"/dashboard\">Back to Dashboard</a></nav>\n<main>\n<h1>User Profile</h1>\n");
    if let Some(image) = &user.profile_image {
        let _ = write!(
            body,
            "<img src=\"{}\" alt=\"{}\">\n",
            escape(image),
            escape(&user.name)
        );
    }
    let _ = write!(
        body,
        "<h2>{}</h2>\n<dl>\n<dt>Email</dt><dd>{}</dd>\n<dt>Timezone</dt><dd>{}</dd>\n</dl>\n",
        escape(&user.name),
        escape(&user.email),
        escape(user.timezone.as_deref().unwrap_or("Not set"))
    );
    if let Some(caregiver) = &user.primary_caregiver {
        let _ = write!(
            body,
            "<h3>Primary Caregiver</h3>\n<dl>\n\
             <dt>Name</dt><dd>{}</dd>\n<dt>Relationship</dt><dd>{}</dd>\n\
             <dt>Contact</dt><dd>{}</dd>\n</dl>\n",
            escape(&caregiver.name),
            escape(&caregiver.relationship),
            escape(&caregiver.contact)
        );
    }
    body.push_str("</main>");
    page("Profile", &body)
}

pub fn people(people: &[Person]) -> Html<String> {
    let mut body = String::new();
    body.push_str(
        "<nav><a href=\"/dashboard\">Back to Dashboard</a> \
         <a href=\"/people/add\">Add Person</a></nav>\n<main>\n<h1>People</h1>\n",
    );
    if people.is_empty() {
        body.push_str("<p>No people added yet.</p>\n");
    } else {
        body.push_str("<ul>\n");
        for person in people {
            let _ = write!(
                body,
                "<li><a href=\"/people/{id}\"><img src=\"{photo}\" alt=\"{name}\">\
                 <h2>{name}</h2><p>{relation}</p><p>{summary}</p></a></li>\n",
                id = escape(&person.id),
                photo = escape(&person.photo),
                name = escape(&person.name),
                relation = escape(&person.relation),
                summary = escape(&person.summary)
            );
        }
        body.push_str("</ul>\n");
    }
    body.push_str("</main>");
    page("People", &body)
}

pub fn add_person_form() -> Html<String> {
    let mut options = String::from("<option value=\"\">Select relationship</option>");
    for relation in Relation::ALL {
        let _ = write!(
            options,
            "<option value=\"{}\">{}</option>",
            relation.as_str(),
            relation.label()
        );
    }

    let body = format!(
        "<nav><a href=\"/people\">Back to People</a></nav>\n<main>\n\
         <h1>Add New Person</h1>\n<p>Add someone you know to help you remember them</p>\n\
         <form method=\"post\" action=\"/api/people\" data-json data-done=\"/people\">\n\
         <label>Photo <input type=\"file\" name=\"photo\" accept=\"image/*\" required></label>\n\
         <label>Name <input type=\"text\" name=\"name\" placeholder=\"Enter person's name\" required></label>\n\
         <label>Relationship <select name=\"relation\" required>{options}</select></label>\n\
         <label>Summary <textarea name=\"summary\" rows=\"4\" required></textarea></label>\n\
         <p role=\"alert\"></p>\n\
         <button type=\"submit\">Add Person</button>\n</form>\n</main>"
    );
    page("Add Person", &body)
}

pub fn person_detail(person: &Person) -> Html<String> {
    let mut body = String::new();
    body.push_str("<nav><a href=\"/people\">Back to People</a></nav>\n<main>\n");
    let _ = write!(
        body,
        "<img src=\"{}\" alt=\"{}\">\n<h1>{}</h1>\n<p>{}</p>\n\
         <h2>About</h2>\n<p>{}</p>\n\
         <dl>\n<dt>Added</dt><dd>{}</dd>\n<dt>Last Updated</dt><dd>{}</dd>\n</dl>\n",
        escape(&person.photo),
        escape(&person.name),
        escape(&person.name),
        escape(&person.relation),
        escape(&person.summary),
        escape(&format_timestamp(&person.created_at)),
        escape(&format_timestamp(&person.updated_at))
    );
    body.push_str("</main>");
    page(&person.name, &body)
}

pub fn conversations(conversations: &[Conversation]) -> Html<String> {
    let mut body = String::new();
    body.push_str("<nav><a href=\"/dashboard\">Back to Dashboard</a></nav>\n<main>\n<h1>Conversations</h1>\n");
    if conversations.is_empty() {
        body.push_str("<p>No conversations recorded yet.</p>\n");
    } else {
        body.push_str("<ul>\n");
        for conversation in conversations {
            let title = match format_date_short(&conversation.created_at) {
                Some(date) => format!("Conversation – {date}"),
                None => "Conversation".to_string(),
            };
            let count = conversation.transcript.len();
            let plural = if count == 1 { "message" } else { "messages" };
            let _ = write!(
                body,
                "<li><a href=\"/conversations/{}\"><h2>{}</h2><p>{}</p><p>{count} {plural}</p></a></li>\n",
                escape(&conversation.id),
                escape(&title),
                escape(&conversation.summary)
            );
        }
        body.push_str("</ul>\n");
    }
    body.push_str("</main>");
    page("Conversations", &body)
}

pub fn conversation_detail(conversation: &Conversation) -> Html<String> {
    let mut body = String::new();
    let _ = write!(
        body,
        "<nav><a href=\"/conversations\">Back to Conversations</a> <time>{}</time></nav>\n<main>\n\
         <section>\n<h1>Summary</h1>\n<p>{}</p>\n</section>\n",
        escape(&format_timestamp(&conversation.created_at)),
        escape(&conversation.summary)
    );

    let count = conversation.transcript.len();
    let plural = if count == 1 { "message" } else { "messages" };
    let _ = write!(
        body,
        "<section>\n<h2>Conversation Transcript</h2>\n<p>{count} {plural}</p>\n<ol>\n"
    );
    for message in &conversation.transcript {
        let label = if message.speaker == "user" {
            "You"
        } else {
            "Assistant"
        };
        let _ = write!(
            body,
            "<li><b>{label}</b><p>{}</p></li>\n",
            escape(&message.text)
        );
    }
    body.push_str("</ol>\n</section>\n</main>");
    page("Conversation", &body)
}

pub fn conversation_missing(message: &str) -> Html<String> {
    let body = format!(
        "<nav><a href=\"/conversations\">Back to Conversations</a></nav>\n\
         <main>\n<p>{}</p>\n</main>",
        escape(message)
    );
    page("Conversation", &body)
}
