/// A named benchmark input.
#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    file: TestFile,
}

impl TestCase {
    pub const fn new(name: &'static str, file: TestFile) -> Self {
        Self { name, file }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn file(&self) -> &TestFile {
        &self.file
    }

    pub fn file_name(&self) -> &'static str {
        self.file().file_name
    }
}

#[derive(Debug, Copy, Clone)]
pub struct TestFile {
    file_name: &'static str,
    content: &'static str,
}

impl TestFile {
    pub const fn new(file_name: &'static str, content: &'static str) -> Self {
        Self { file_name, content }
    }

    pub fn content(&self) -> &'static str {
        self.content
    }

    pub fn file_name(&self) -> &'static str {
        self.file_name
    }
}

/// A request path to route, and whether a route is expected to match it.
#[derive(Debug, Copy, Clone)]
pub struct RouteCase {
    pub name: &'static str,
    pub path: &'static str,
    pub matches: bool,
}

impl RouteCase {
    pub const fn hit(name: &'static str, path: &'static str) -> Self {
        Self { name, path, matches: true }
    }

    pub const fn miss(name: &'static str, path: &'static str) -> Self {
        Self { name, path, matches: false }
    }
}
