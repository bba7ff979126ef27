//! Form payloads and their validation. Every form deserializes leniently (missing fields become
//! empty strings, text fields are trimmed) and validation turns it into a typed value or a set of
//! field errors.

use std::{borrow::Cow, collections::BTreeMap};

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{storage::entities::DEFAULT_PROJECT_COLOR, utils::time::parse_date};

const REQUIRED: &str = "This field is required.";

/// Field name to messages. Serialized as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form_errors = FormErrors::default();
        for (field, errors) in errors.field_errors() {
            for error in errors {
                let message = match &error.message {
                    Some(message) => message.to_string(),
                    None => error.code.to_string(),
                };
                form_errors.add(&field, message);
            }
        }
        form_errors
    }
}

fn validated<T: Validate>(value: T) -> Result<T, FormErrors> {
    value.validate()?;
    Ok(value)
}

fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(String::deserialize(deserializer)?.trim().to_string())
}

fn username_characters(value: &str) -> Result<(), ValidationError> {
    if value.chars().all(|c| c.is_alphanumeric() || "@.+-_".contains(c)) {
        Ok(())
    } else {
        Err(ValidationError::new("username_characters").with_message(Cow::Borrowed(
            "Use only letters, digits and @/./+/-/_ characters.",
        )))
    }
}

fn hours_value(value: &str) -> Result<(), ValidationError> {
    let message = match value.parse::<f64>() {
        _ if value.is_empty() => REQUIRED,
        Ok(hours) if hours.is_finite() && hours >= 0. => return Ok(()),
        Ok(_) => "Hours can't be negative.",
        Err(_) => "Enter a number.",
    };
    Err(ValidationError::new("hours").with_message(Cow::Borrowed(message)))
}

/// Both settings forms share one endpoint and are told apart by `action`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SettingsForm {
    pub action: String,
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
    #[serde(deserialize_with = "trimmed")]
    pub timezone: String,
}

#[derive(Debug, PartialEq, Eq, Validate)]
pub struct PasswordChange {
    #[validate(length(min = 1, message = "This field is required."))]
    pub old_password: String,
    #[validate(length(min = 8, message = "Password must have at least 8 characters."))]
    pub new_password: String,
    #[validate(must_match(other = "new_password", message = "Passwords don't match."))]
    pub confirm_password: String,
}

impl SettingsForm {
    pub fn password_change(&self) -> Result<PasswordChange, FormErrors> {
        validated(PasswordChange {
            old_password: self.old_password.clone(),
            new_password: self.new_password.clone(),
            confirm_password: self.confirm_password.clone(),
        })
    }

    /// Only names known to the IANA database are accepted.
    pub fn timezone(&self) -> Result<Tz, FormErrors> {
        let name = self.timezone.as_str();
        if name.is_empty() {
            return Err(FormErrors::single("timezone", REQUIRED));
        }
        name.parse::<Tz>().map_err(|_| {
            FormErrors::single("timezone", format!("{name} is not a known timezone."))
        })
    }
}

/// Register and login share one page and are told apart by `action`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub action: String,
    #[serde(deserialize_with = "trimmed")]
    pub username: String,
    #[serde(deserialize_with = "trimmed")]
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, PartialEq, Eq, Validate)]
pub struct Registration {
    #[validate(length(min = 1, message = "This field is required."))]
    #[validate(length(max = 150, message = "Use at most 150 characters."))]
    #[validate(custom(function = "username_characters"))]
    pub username: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must have at least 8 characters."))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords don't match."))]
    pub confirm_password: String,
}

#[derive(Debug, PartialEq, Eq, Validate)]
pub struct Login {
    #[validate(length(min = 1, message = "This field is required."))]
    pub username: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,
}

impl RegisterForm {
    pub fn registration(&self) -> Result<Registration, FormErrors> {
        validated(Registration {
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            confirm_password: self.confirm_password.clone(),
        })
    }

    pub fn login(&self) -> Result<Login, FormErrors> {
        validated(Login {
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ProjectForm {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "This field is required."))]
    #[validate(length(max = 100, message = "Use at most 100 characters."))]
    pub name: String,
    #[serde(deserialize_with = "trimmed")]
    pub color: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub color: String,
}

impl ProjectForm {
    pub fn project(&self) -> Result<NewProject, FormErrors> {
        self.validate()?;
        let color = match self.color.as_str() {
            "" => DEFAULT_PROJECT_COLOR,
            color => color,
        };
        Ok(NewProject {
            name: self.name.clone(),
            color: color.to_string(),
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct TrackTimeForm {
    #[serde(deserialize_with = "trimmed")]
    #[validate(custom(function = "hours_value"))]
    pub hours: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "This field is required."))]
    #[validate(length(max = 200, message = "Use at most 200 characters."))]
    pub activity: String,
    #[serde(deserialize_with = "trimmed")]
    pub track_date: String,
}

#[derive(Debug, PartialEq)]
pub struct TrackTime {
    pub hours: f64,
    pub activity: String,
    /// `None` means the current day of the user.
    pub track_date: Option<NaiveDate>,
}

impl TrackTimeForm {
    pub fn track_time(&self) -> Result<TrackTime, FormErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::default(),
            Err(e) => e.into(),
        };

        let track_date = match self.track_date.as_str() {
            "" => None,
            value => {
                let date = parse_date(value);
                if date.is_none() {
                    errors.add("track_date", "Enter a date as YYYY-MM-DD.");
                }
                date
            }
        };

        match self.hours.parse::<f64>() {
            Ok(hours) if errors.is_empty() => Ok(TrackTime {
                hours,
                activity: self.activity.clone(),
                track_date,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde::de::DeserializeOwned;
    use serde_json::{json, Value};

    use super::{ProjectForm, RegisterForm, SettingsForm, TrackTimeForm};

    fn form<T: DeserializeOwned>(value: Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    fn register_form(username: &str, email: &str, password: &str, confirm: &str) -> RegisterForm {
        form(json!({
            "action": "register",
            "username": username,
            "email": email,
            "password": password,
            "confirm_password": confirm,
        }))
    }

    #[test]
    fn test_registration() {
        let registration = register_form(" alice ", "alice@example.com", "password1", "password1")
            .registration()
            .unwrap();
        assert_eq!(registration.username, "alice");
        assert_eq!(registration.email, "alice@example.com");

        let errors = register_form("al ice", "nope", "short", "other")
            .registration()
            .unwrap_err();
        assert_eq!(
            errors.get("username").unwrap(),
            ["Use only letters, digits and @/./+/-/_ characters.".to_string()]
        );
        assert_eq!(
            errors.get("email").unwrap(),
            ["Enter a valid email address.".to_string()]
        );
        assert!(errors.get("password").is_some());
        assert_eq!(
            errors.get("confirm_password").unwrap(),
            ["Passwords don't match.".to_string()]
        );
    }

    #[test]
    fn test_username_length() {
        let long = "a".repeat(151);
        let errors = register_form(&long, "alice@example.com", "password1", "password1")
            .registration()
            .unwrap_err();
        assert_eq!(
            errors.get("username").unwrap(),
            ["Use at most 150 characters.".to_string()]
        );
    }

    #[test]
    fn test_login_requires_both_fields() {
        let errors = register_form("  ", "", "", "").login().unwrap_err();
        assert!(errors.get("username").is_some());
        assert!(errors.get("password").is_some());
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let form: RegisterForm = form(json!({"action": "login"}));
        assert_eq!(form.username, "");
        assert!(form.login().is_err());
    }

    #[test]
    fn test_timezone() {
        let settings: SettingsForm = form(json!({"timezone": " Europe/Kyiv "}));
        assert_eq!(settings.timezone().unwrap(), chrono_tz::Europe::Kyiv);

        let settings: SettingsForm = form(json!({"timezone": "Europe/Atlantis"}));
        assert!(settings.timezone().unwrap_err().get("timezone").is_some());
    }

    #[test]
    fn test_password_change() {
        let settings: SettingsForm = form(json!({
            "old_password": "old",
            "new_password": "new password",
            "confirm_password": "new password",
        }));
        assert_eq!(
            settings.password_change().unwrap().new_password,
            "new password"
        );

        let settings: SettingsForm = form(json!({
            "new_password": "new password",
            "confirm_password": "different",
        }));
        let errors = settings.password_change().unwrap_err();
        assert!(errors.get("old_password").is_some());
        assert!(errors.get("confirm_password").is_some());
        assert!(errors.get("new_password").is_none());
    }

    #[test]
    fn test_project_defaults_color() {
        let project: ProjectForm = form(json!({"name": " Garden ", "color": ""}));
        let project = project.project().unwrap();
        assert_eq!(project.name, "Garden");
        assert_eq!(project.color, "#337ab7");

        assert!(ProjectForm::default().project().is_err());
        let project: ProjectForm = form(json!({"name": "x".repeat(101)}));
        assert_eq!(
            project.project().unwrap_err().get("name").unwrap(),
            ["Use at most 100 characters.".to_string()]
        );
    }

    #[test]
    fn test_track_time() {
        let track: TrackTimeForm =
            form(json!({"hours": "1.5", "activity": "weeding", "track_date": ""}));
        let track = track.track_time().unwrap();
        assert_eq!(track.hours, 1.5);
        assert_eq!(track.track_date, None);

        let track: TrackTimeForm =
            form(json!({"hours": "2", "activity": "weeding", "track_date": "2023-03-15"}));
        assert_eq!(
            track.track_time().unwrap().track_date,
            NaiveDate::from_ymd_opt(2023, 3, 15)
        );

        let track: TrackTimeForm =
            form(json!({"hours": "-1", "activity": " ", "track_date": "15.03.2023"}));
        let errors = track.track_time().unwrap_err();
        assert_eq!(
            errors.get("hours").unwrap(),
            ["Hours can't be negative.".to_string()]
        );
        assert!(errors.get("activity").is_some());
        assert!(errors.get("track_date").is_some());

        let track: TrackTimeForm =
            form(json!({"hours": "many", "activity": "weeding", "track_date": ""}));
        assert_eq!(
            track.track_time().unwrap_err().get("hours").unwrap(),
            ["Enter a number.".to_string()]
        );

        let track: TrackTimeForm = form(json!({"activity": "weeding"}));
        assert_eq!(
            track.track_time().unwrap_err().get("hours").unwrap(),
            ["This field is required.".to_string()]
        );
    }
}
