//! Fixture project shared by the integration tests: a small Django site laid
//! out the way the default content patterns expect.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const PROJECT_CONFIG: &str = r#"/** @type {import('tailwindcss').Config} */
module.exports = {
    content: [
        './templates/**/*.html',
        './events/templates/**/*.html',
        './**/templates/**/*.html',
        './**/*.py',
    ],
    theme: {
        extend: {},
    },
    plugins: [],
}
"#;

pub const BASE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<body class="bg-gray-100 min-h-screen">
    <nav class="bg-blue-600 text-white p-4 shadow">
        <a href="{% url 'event_list' %}" class="text-xl font-bold">Events</a>
    </nav>
    <main class="container mx-auto p-4">{% block content %}{% endblock %}</main>
</body>
</html>
"#;

pub const EVENT_LIST_HTML: &str = r#"{% extends 'base.html' %}

{% block content %}
<div class="mb-6 flex justify-between items-center">
    <h2 class="text-3xl font-bold">All Events</h2>
    <a href="{% url 'event_create' %}" class="bg-blue-600 hover:bg-blue-700 text-white font-bold py-2 px-4 rounded">
        + Create Event
    </a>
</div>
{% endblock %}
"#;

pub const LOGIN_HTML: &str = r#"<form method="post" class="max-w-md mx-auto bg-white p-6 rounded shadow">
    <button type="submit" class="w-full bg-green-600 hover:bg-green-700 text-white py-2 rounded">Log in</button>
</form>
"#;

pub const FORMS_PY: &str = r#"from django import forms


class EventForm(forms.ModelForm):
    class Meta:
        widgets = {
            'date': forms.DateInput(attrs={'type': 'date', 'class': 'w-full rounded-md border p-2'}),
        }
"#;

pub fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Build the fixture project in a fresh temporary directory
pub fn django_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "templates/base.html", BASE_HTML);
    write(root, "events/templates/events/event_list.html", EVENT_LIST_HTML);
    write(root, "accounts/templates/accounts/login.html", LOGIN_HTML);
    write(root, "events/forms.py", FORMS_PY);
    write(root, "events/views.py", "from django.shortcuts import render\n");
    write(root, "accounts/models.py", "from django.db import models\n");
    write(root, "static/css/output.css", ".p-4{padding:1rem}\n");
    write(root, "node_modules/flowbite/templates/modal.html", r#"<div class="fixed inset-0"></div>"#);
    write(root, "events/__pycache__/views.cpython-312.py", "cached");
    dir
}

/// Root-relative paths of resolved files, `/`-separated
pub fn relative_paths(files: &[tailwind_content::ContentFile]) -> Vec<String> {
    files
        .iter()
        .map(|f| f.relative.to_string_lossy().replace('\\', "/"))
        .collect()
}
