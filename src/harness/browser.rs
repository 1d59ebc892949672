use std::time::Instant;

use crate::error::LOGIN_PATH;
use crate::harness::config::HarnessConfig;
use crate::harness::date_entry::{parse_scenario_date, DateEntry};
use crate::harness::error::{HarnessError, HarnessResult};
use crate::harness::page::{Element, Page};
use crate::models::Role;
use crate::seed::credentials_for;

/// A scripted user session against a running server.
///
/// Each step performs what a person would do in a browser (follow a link, fill in and
/// submit a form) and returns the text they would read afterwards. Cookies persist for
/// the lifetime of the `Browser`, so a login carries over to later steps.
pub struct Browser {
    client: reqwest::Client,
    base_url: String,
    config: HarnessConfig,
    date_entry: Box<dyn DateEntry>,
    page: Option<Page>,
}

impl Browser {
    pub fn new(base_url: impl Into<String>, config: HarnessConfig) -> HarnessResult<Self> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        let date_entry = config.date_entry.strategy();
        Ok(Browser {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            config,
            date_entry,
            page: None,
        })
    }

    /// The page loaded by the last step.
    pub fn current(&self) -> HarnessResult<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| HarnessError::MissingElement("no page has been loaded".into()))
    }

    fn absolute(&self, target: &str) -> String {
        if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else {
            format!("{}{}", self.base_url, target)
        }
    }

    pub async fn visit(&mut self, target: &str) -> HarnessResult<&Page> {
        let response = self.client.get(self.absolute(target)).send().await?;
        self.load(response).await
    }

    /// Posts `fields` as a url-encoded form and follows the redirect that answers it.
    pub async fn submit(&mut self, action: &str, fields: &[(&str, String)]) -> HarnessResult<&Page> {
        let response = self
            .client
            .post(self.absolute(action))
            .form(fields)
            .send()
            .await?;
        self.load(response).await
    }

    async fn load(&mut self, response: reqwest::Response) -> HarnessResult<&Page> {
        let status = response.status();
        let url = response.url().to_string();
        let page = Page::new(url.clone(), response.text().await?);

        if let Some(alert) = page.find_with_class("div", "alert-danger") {
            return Err(HarnessError::Rejected(format!("{} ({})", alert.text(), status)));
        }
        if !status.is_success() {
            return Err(HarnessError::Rejected(format!("{} answered {}", url, status)));
        }

        log::debug!("Loaded {}", url);
        Ok(self.page.insert(page))
    }

    /// Polls the current page until `check` finds what it looks for, reloading between
    /// attempts. Fails with `HarnessError::Timeout` once the configured timeout has passed.
    pub async fn wait_for<T>(
        &mut self,
        what: &str,
        check: impl Fn(&Page) -> Option<T>,
    ) -> HarnessResult<T> {
        let started = Instant::now();
        loop {
            if let Some(found) = self.page.as_ref().and_then(&check) {
                return Ok(found);
            }
            if started.elapsed() >= self.config.timeout {
                return Err(HarnessError::Timeout {
                    waiting_for: what.to_string(),
                    after: self.config.timeout,
                });
            }
            tokio::time::sleep(self.config.poll_interval).await;

            let url = self.current()?.url().to_string();
            self.visit(&url).await?;
        }
    }

    /// Logs in with the fixed credentials of `role` and returns the landing page's heading.
    pub async fn login_as(&mut self, role: Role) -> HarnessResult<String> {
        let (username, password) = credentials_for(role);
        self.visit(LOGIN_PATH).await?;
        self.submit(
            LOGIN_PATH,
            &[("username", username.to_string()), ("password", password.to_string())],
        )
        .await?;
        self.wait_for("the index heading", heading_text).await
    }

    /// Logs out and returns the login page's heading.
    pub async fn logout(&mut self) -> HarnessResult<String> {
        self.visit("/logout/").await?;
        self.wait_for("the login heading", heading_text).await
    }

    /// Creates a list through the index page's primary button; returns the success alert.
    pub async fn create_list(&mut self, name: &str) -> HarnessResult<String> {
        let create_url = self
            .visit("/")
            .await?
            .find_all("a")
            .into_iter()
            .find(|a| a.has_class("btn-primary"))
            .and_then(|a| a.attr("href"))
            .ok_or_else(|| HarnessError::MissingElement("create list button".into()))?;

        let form_page = self.visit(&create_url).await?;
        let mut fields = vec![("name", name.to_string())];
        if let Some(group) = form_page
            .find("select")
            .and_then(|select| select.find("option"))
            .and_then(|option| option.attr("value"))
        {
            fields.push(("group", group));
        }
        let action = form_action(form_page, |_| true).unwrap_or(create_url);

        self.submit(&action, &fields).await?;
        self.wait_for("the success alert", success_alert_text).await
    }

    /// Opens the list whose URL contains `slug`; returns its heading.
    pub async fn open_list(&mut self, slug: &str) -> HarnessResult<String> {
        let fragment = format!("/{}/", slug);
        let href = self
            .visit("/")
            .await?
            .main()
            .and_then(|main| {
                main.find_all("a")
                    .into_iter()
                    .filter_map(|a| a.attr("href"))
                    .find(|href| href.contains(&fragment))
            })
            .ok_or_else(|| HarnessError::MissingElement(format!("link to list {}", slug)))?;

        self.visit(&href).await?;
        self.wait_for("the list heading", heading_text).await
    }

    /// Opens the first list on the index and returns its name as the link showed it.
    pub async fn open_first_list(&mut self) -> HarnessResult<String> {
        let link = self
            .visit("/")
            .await?
            .main()
            .and_then(|main| main.find("ul"))
            .and_then(|ul| ul.find("li"))
            .and_then(|li| li.find("a"))
            .ok_or_else(|| HarnessError::MissingElement("first list on the index".into()))?;
        let href = link
            .attr("href")
            .ok_or_else(|| HarnessError::MissingElement("first list link target".into()))?;

        self.visit(&href).await?;
        self.wait_for("the list heading", heading_text).await?;
        Ok(link.text())
    }

    /// Names of the lists on the index page.
    pub async fn list_names(&mut self) -> HarnessResult<Vec<String>> {
        let names = self
            .visit("/")
            .await?
            .main()
            .and_then(|main| main.find("ul"))
            .map(|ul| {
                ul.find_all("li")
                    .iter()
                    .filter_map(|li| li.find("a"))
                    .map(|a| a.text())
                    .collect()
            })
            .unwrap_or_default();
        Ok(names)
    }

    /// Fills in and submits the add-task form of the open list; returns the success alert.
    ///
    /// `due` is typed as `dd-mm-yyyy` and entered with the configured date entry style.
    pub async fn add_task(&mut self, title: &str, note: &str, due: &str) -> HarnessResult<String> {
        let due = parse_scenario_date(due)?;
        let page = self.current()?;
        let action = form_action(page, |form| form.attr("id").as_deref() == Some("add-task-form"))
            .ok_or_else(|| HarnessError::MissingElement("add task form".into()))?;

        let mut fields = vec![
            ("title", title.to_string()),
            ("note", note.to_string()),
            ("add_edit_task", String::new()),
        ];
        fields.extend(self.date_entry.fields(due));

        self.submit(&action, &fields).await?;
        self.wait_for("the success alert", success_alert_text).await
    }

    /// Rows of the open list's task table, not counting the header row.
    pub fn incomplete_task_count(&self) -> HarnessResult<usize> {
        let table = self
            .current()?
            .find_with_class("table", "tasks")
            .ok_or_else(|| HarnessError::MissingElement("task table".into()))?;
        Ok(table.find_all("tr").len().saturating_sub(1))
    }

    /// Opens the first task of the open list and returns its title as the table showed it.
    pub async fn open_first_task(&mut self) -> HarnessResult<String> {
        let link = self
            .current()?
            .find_with_class("table", "tasks")
            .and_then(|table| table.find_all("tr").into_iter().nth(1))
            .and_then(|row| row.find("td"))
            .and_then(|cell| cell.find("a"))
            .ok_or_else(|| HarnessError::MissingElement("first task in the table".into()))?;
        let href = link
            .attr("href")
            .ok_or_else(|| HarnessError::MissingElement("first task link target".into()))?;

        self.visit(&href).await?;
        self.wait_for("the task title", card_title_text).await?;
        Ok(link.text())
    }

    /// Title shown on the open task's detail card.
    pub fn card_title(&self) -> HarnessResult<String> {
        card_title_text(self.current()?)
            .ok_or_else(|| HarnessError::MissingElement("task card title".into()))
    }

    /// Posts a comment on the open task; returns the page's section headings.
    pub async fn add_comment(&mut self, body: &str) -> HarnessResult<Vec<String>> {
        let page = self.current()?;
        let action = form_action(page, |form| {
            form.find("textarea").and_then(|t| t.attr("name")).as_deref() == Some("comment-body")
        })
        .ok_or_else(|| HarnessError::MissingElement("comment form".into()))?;

        self.submit(&action, &[("comment-body", body.to_string())]).await?;
        self.wait_for("the comment section", |page| {
            let headings = page.texts("h5");
            (!headings.is_empty()).then_some(headings)
        })
        .await
    }

    pub fn section_headings(&self) -> HarnessResult<Vec<String>> {
        Ok(self.current()?.texts("h5"))
    }

    /// Follows the open page's toggle link; returns the success alert.
    pub async fn toggle_done(&mut self) -> HarnessResult<String> {
        let href = self
            .current()?
            .link_containing("toggle_done")
            .ok_or_else(|| HarnessError::MissingElement("toggle done link".into()))?;

        self.visit(&href).await?;
        self.wait_for("the success alert", success_alert_text).await
    }

    /// Follows the open list's delete link; returns the confirmation heading.
    pub async fn open_delete_for_current_list(&mut self) -> HarnessResult<String> {
        let href = self
            .current()?
            .main()
            .and_then(|main| {
                main.find_all("a")
                    .into_iter()
                    .filter_map(|a| a.attr("href"))
                    .find(|href| href.contains("delete"))
            })
            .ok_or_else(|| HarnessError::MissingElement("delete list link".into()))?;

        self.visit(&href).await?;
        self.wait_for("the delete heading", heading_text).await
    }

    /// Presses `delete-confirm` on the confirmation page; returns the success alert.
    pub async fn confirm_delete(&mut self) -> HarnessResult<String> {
        let page = self.current()?;
        let action = form_action(page, |form| form.inner_html().contains("name=\"delete-confirm\""))
            .ok_or_else(|| HarnessError::MissingElement("delete confirmation form".into()))?;

        self.submit(&action, &[("delete-confirm", "1".to_string())]).await?;
        self.wait_for("the success alert", success_alert_text).await
    }

    pub fn heading(&self) -> HarnessResult<String> {
        heading_text(self.current()?).ok_or_else(|| HarnessError::MissingElement("h1".into()))
    }

    pub fn success_alert(&self) -> HarnessResult<String> {
        success_alert_text(self.current()?)
            .ok_or_else(|| HarnessError::MissingElement("success alert".into()))
    }

    pub fn footer_text(&self) -> HarnessResult<String> {
        self.current()?
            .find_with_class("p", "text-muted")
            .map(|p| p.text())
            .ok_or_else(|| HarnessError::MissingElement("footer".into()))
    }
}

fn heading_text(page: &Page) -> Option<String> {
    page.find("h1").map(|h1| h1.text())
}

fn success_alert_text(page: &Page) -> Option<String> {
    page.find_with_class("div", "alert-success").map(|alert| alert.text())
}

fn card_title_text(page: &Page) -> Option<String> {
    page.find_with_class("h3", "card-title").map(|h3| h3.text())
}

/// `action` of the first form on `page` accepted by `select`; an empty action posts back to
/// the page itself.
fn form_action(page: &Page, select: impl Fn(&Element) -> bool) -> Option<String> {
    page.find_all("form")
        .into_iter()
        .find(|form| select(form))
        .map(|form| form.attr("action").unwrap_or_default())
        .map(|action| if action.is_empty() { page.url().to_string() } else { action })
}
