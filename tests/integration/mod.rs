//! Integration tests driving the public monitor API through a fake page.

mod support;
mod webdriver_protocol;
