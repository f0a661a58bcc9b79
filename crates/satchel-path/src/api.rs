// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! `path` operations over plain strings
//!
//! Everything here is string algebra: nothing touches the filesystem, and the
//! only ambient input is the working directory configured on the [`PathApi`].

use crate::components::PathComponents;
use crate::error::{PathError, Result};
use crate::style::{Style, has_drive_prefix};
use std::borrow::Cow;

/// Path operations for one separator convention
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathApi {
    style: Style,
    cwd: String,
}

impl PathApi {
    /// Create an API for `style` with the style's default working directory
    /// (`/` for POSIX, `C:\` for Win32)
    pub fn new(style: Style) -> Self {
        let cwd = match style {
            Style::Posix => "/",
            Style::Win32 => "C:\\",
        };
        Self {
            style,
            cwd: cwd.to_string(),
        }
    }

    /// POSIX API rooted at `/`
    pub fn posix() -> Self {
        Self::new(Style::Posix)
    }

    /// Win32 API rooted at `C:\`
    pub fn win32() -> Self {
        Self::new(Style::Win32)
    }

    /// Host-style API using the process working directory
    pub fn native() -> Self {
        let api = Self::new(Style::native());
        match std::env::current_dir() {
            Ok(dir) => api.with_cwd(dir.to_string_lossy()),
            Err(_) => api,
        }
    }

    /// Replace the working directory used by [`resolve`](Self::resolve)
    pub fn with_cwd(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = cwd.into();
        self
    }

    /// Separator convention
    pub fn style(&self) -> Style {
        self.style
    }

    /// Working directory used by `resolve`
    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    /// `path.sep`
    pub fn sep(&self) -> char {
        self.style.sep()
    }

    /// `path.delimiter`
    pub fn delimiter(&self) -> char {
        self.style.delimiter()
    }

    /// path.isAbsolute(path)
    pub fn is_absolute(&self, path: &str) -> bool {
        let bytes = path.as_bytes();
        let Some(&first) = bytes.first() else {
            return false;
        };
        if self.style.is_sep_byte(first) {
            return true;
        }
        self.style == Style::Win32
            && bytes.len() > 2
            && has_drive_prefix(bytes)
            && self.style.is_sep_byte(bytes[2])
    }

    /// path.dirname(path)
    pub fn dirname(&self, path: &str) -> String {
        if path.is_empty() {
            return ".".to_string();
        }
        let root_len = self.style.root_len(path);
        let end = self.trim_trailing(path, root_len);
        let root_or_dot = || {
            if root_len > 0 {
                path[..root_len].to_string()
            } else {
                ".".to_string()
            }
        };

        if end == root_len {
            return root_or_dot();
        }
        match self.last_sep(&path[root_len..end]) {
            None => root_or_dot(),
            Some(index) => {
                let cut = self.trim_trailing(&path[..root_len + index], root_len);
                if cut == root_len {
                    root_or_dot()
                } else {
                    path[..cut].to_string()
                }
            }
        }
    }

    /// path.basename(path, ext?)
    ///
    /// `ext` is only stripped when it is a proper suffix of the final segment.
    pub fn basename(&self, path: &str, ext: Option<&str>) -> String {
        let (start, end) = self.base_range(path);
        let base = &path[start..end];
        match ext {
            Some(ext) if !ext.is_empty() && base.len() > ext.len() && base.ends_with(ext) => {
                base[..base.len() - ext.len()].to_string()
            }
            _ => base.to_string(),
        }
    }

    /// path.extname(path)
    pub fn extname(&self, path: &str) -> String {
        let (start, end) = self.base_range(path);
        extension_of(&path[start..end]).to_string()
    }

    /// path.normalize(path)
    ///
    /// `..` above a root is dropped; leading `..` of a relative path is kept.
    pub fn normalize(&self, path: &str) -> String {
        if path.is_empty() {
            return ".".to_string();
        }
        let sep = self.sep();
        let path: Cow<'_, str> = match self.style {
            Style::Win32 => Cow::Owned(path.replace('/', "\\")),
            Style::Posix => Cow::Borrowed(path),
        };
        let (root, rest) = path.split_at(self.style.root_len(&path));
        let trailing = rest.ends_with(|c: char| self.style.is_sep(c));

        // `\\host\share` is part of a UNC root
        let unc = self.style == Style::Win32
            && root.len() == 2
            && root.bytes().all(|b| self.style.is_sep_byte(b));
        let mut floor = 0;

        let mut segments: Vec<&str> = Vec::new();
        for segment in rest.split(|c: char| self.style.is_sep(c)) {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.len() > floor && segments.last().is_some_and(|last| *last != "..") {
                        segments.pop();
                    } else if root.is_empty() {
                        segments.push("..");
                    }
                }
                segment => {
                    segments.push(segment);
                    if unc && floor < 2 && segments.len() == floor + 1 {
                        floor += 1;
                    }
                }
            }
        }

        let mut normalized = String::with_capacity(path.len());
        normalized.push_str(root);
        normalized.push_str(&segments.join(self.sep_str()));
        if normalized.is_empty() {
            return if trailing { format!(".{sep}") } else { ".".to_string() };
        }
        if trailing && !segments.is_empty() {
            normalized.push(sep);
        }
        normalized
    }

    /// path.join(...paths)
    pub fn join<S: AsRef<str>>(&self, segments: &[S]) -> String {
        let joined = segments
            .iter()
            .map(|segment| segment.as_ref())
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join(self.sep_str());
        self.normalize(&joined)
    }

    /// path.resolve(...paths)
    ///
    /// A Win32 drive-relative segment (`C:foo`) is resolved against the cwd
    /// when it is on the same drive, otherwise against the drive's root.
    pub fn resolve<S: AsRef<str>>(&self, segments: &[S]) -> String {
        let mut device: Option<&str> = None;
        let mut parts: Vec<&str> = Vec::new();
        let mut absolute = false;

        let candidates = segments
            .iter()
            .rev()
            .map(|segment| segment.as_ref())
            .chain(std::iter::once(self.cwd.as_str()));
        for segment in candidates {
            if segment.is_empty() {
                continue;
            }
            let mut body = segment;
            if let Some(drive) = self.drive_of(segment) {
                match device {
                    Some(current) if !current.eq_ignore_ascii_case(drive) => continue,
                    Some(_) => {}
                    None => device = Some(drive),
                }
                body = &segment[drive.len()..];
            }
            if !body.is_empty() {
                parts.push(body);
            }
            if self.is_absolute(body) {
                absolute = true;
                break;
            }
        }
        if !absolute && device.is_some() {
            parts.push(self.sep_str());
        }

        let mut joined = String::from(device.unwrap_or_default());
        for (i, part) in parts.into_iter().rev().enumerate() {
            if i > 0 && !joined.ends_with(|c: char| self.style.is_sep(c)) {
                joined.push(self.sep());
            }
            joined.push_str(part);
        }

        let mut normalized = self.normalize(&joined);
        let root_len = self.style.root_len(&normalized);
        if normalized.len() > root_len && normalized.ends_with(|c: char| self.style.is_sep(c)) {
            normalized.pop();
        }
        normalized
    }

    /// path.relative(from, to)
    ///
    /// Fails with [`PathError::AmbiguousRoot`] when the paths share no root,
    /// e.g. two different Win32 drives.
    pub fn relative(&self, from: &str, to: &str) -> Result<String> {
        if from == to {
            return Ok(String::new());
        }
        let from = self.resolve(&[from]);
        let to = self.resolve(&[to]);
        if from == to {
            return Ok(String::new());
        }

        let mut base = from.clone();
        let mut up = 0;
        let suffix = loop {
            if let Some(rest) = self.strip_dir_prefix(&to, &base) {
                break rest;
            }
            let parent = self.dirname(&base);
            if parent == base {
                return Err(PathError::AmbiguousRoot { from, to });
            }
            base = parent;
            up += 1;
        };

        let mut parts = vec![".."; up];
        if !suffix.is_empty() {
            parts.push(suffix);
        }
        Ok(parts.join(self.sep_str()))
    }

    /// path.parse(path)
    pub fn parse(&self, path: &str) -> PathComponents {
        if path.is_empty() {
            return PathComponents::default();
        }
        let root_len = self.style.root_len(path);
        let (start, end) = self.base_range(path);
        let base = &path[start..end];
        let ext = extension_of(base);
        let dir_end = self.trim_trailing(&path[..start], root_len);

        PathComponents {
            root: path[..root_len].to_string(),
            dir: path[..dir_end].to_string(),
            base: base.to_string(),
            name: base[..base.len() - ext.len()].to_string(),
            ext: ext.to_string(),
        }
    }

    /// path.format(pathObject)
    pub fn format(&self, components: &PathComponents) -> String {
        let base = if components.base.is_empty() {
            format!("{}{}", components.name, components.ext)
        } else {
            components.base.clone()
        };

        if components.dir.is_empty() || components.dir == components.root {
            format!("{}{}", components.root, base)
        } else {
            format!("{}{}{}", components.dir, self.sep(), base)
        }
    }

    /// path.toNamespacedPath(path) - identity on POSIX
    pub fn to_namespaced_path(&self, path: &str) -> String {
        if self.style == Style::Posix || path.is_empty() {
            return path.to_string();
        }
        let resolved = self.resolve(&[path]);
        let bytes = resolved.as_bytes();
        if bytes.len() < 2 {
            return path.to_string();
        }

        if bytes[0] == b'\\' && bytes[1] == b'\\' {
            // Already a long path (`\\?\` or `\\.\`)
            if matches!(bytes.get(2), Some(b'?') | Some(b'.')) {
                return path.to_string();
            }
            format!("\\\\?\\UNC\\{}", &resolved[2..])
        } else if has_drive_prefix(bytes) {
            format!("\\\\?\\{resolved}")
        } else {
            path.to_string()
        }
    }

    /// The `C:` prefix of a Win32 path
    fn drive_of<'p>(&self, path: &'p str) -> Option<&'p str> {
        (self.style == Style::Win32 && has_drive_prefix(path.as_bytes())).then(|| &path[..2])
    }

    fn sep_str(&self) -> &'static str {
        match self.style {
            Style::Posix => "/",
            Style::Win32 => "\\",
        }
    }

    /// Index just past the last non-separator character, never inside the root
    fn trim_trailing(&self, path: &str, root_len: usize) -> usize {
        let bytes = path.as_bytes();
        let mut end = path.len();
        while end > root_len && self.style.is_sep_byte(bytes[end - 1]) {
            end -= 1;
        }
        end
    }

    fn last_sep(&self, path: &str) -> Option<usize> {
        path.rfind(|c: char| self.style.is_sep(c))
    }

    /// Byte range of the final segment, ignoring trailing separators
    fn base_range(&self, path: &str) -> (usize, usize) {
        let root_len = self.style.root_len(path);
        let end = self.trim_trailing(path, root_len);
        let start = self
            .last_sep(&path[root_len..end])
            .map_or(root_len, |index| root_len + index + 1);
        (start, end)
    }

    /// Remainder of `path` below `dir`, if `dir` is an ancestor at a segment boundary
    fn strip_dir_prefix<'a>(&self, path: &'a str, dir: &str) -> Option<&'a str> {
        let rest = path.strip_prefix(dir)?;
        if rest.is_empty() || dir.ends_with(|c: char| self.style.is_sep(c)) {
            return Some(rest);
        }
        let mut chars = rest.chars();
        match chars.next() {
            Some(c) if self.style.is_sep(c) => Some(chars.as_str()),
            _ => None,
        }
    }
}

impl Default for PathApi {
    fn default() -> Self {
        Self::posix()
    }
}

/// Extension of a single segment: from the last `.` unless the segment starts with it
fn extension_of(base: &str) -> &str {
    if base == ".." {
        return "";
    }
    match base.rfind('.') {
        None | Some(0) => "",
        Some(index) => &base[index..],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posix() -> PathApi {
        PathApi::posix()
    }

    fn win32() -> PathApi {
        PathApi::win32()
    }

    #[test]
    fn test_normalize() {
        let p = posix();
        assert_eq!(p.normalize("/a/b/../c"), "/a/c");
        assert_eq!(p.normalize(""), ".");
        assert_eq!(p.normalize("/foo/bar//baz/asdf/quux/.."), "/foo/bar/baz/asdf");
        assert_eq!(p.normalize("foo/bar/../baz"), "foo/baz");
        assert_eq!(p.normalize("./a/./b/"), "a/b/");
        assert_eq!(p.normalize("/"), "/");
        assert_eq!(p.normalize("a/.."), ".");
        assert_eq!(p.normalize("../a"), "../a");
    }

    #[test]
    fn test_normalize_above_root_is_noop() {
        assert_eq!(posix().normalize("/.."), "/");
        assert_eq!(posix().normalize("/a/../../b"), "/b");
        assert_eq!(win32().normalize("C:\\..\\x"), "C:\\x");
    }

    #[test]
    fn test_normalize_win32() {
        let w = win32();
        assert_eq!(w.normalize("C:/a/b/../c"), "C:\\a\\c");
        assert_eq!(w.normalize("\\\\host\\share\\dir\\..\\f"), "\\\\host\\share\\f");
        assert_eq!(w.normalize("//host/share/"), "\\\\host\\share\\");
        assert_eq!(w.normalize("\\\\host\\share\\.."), "\\\\host\\share");
        assert_eq!(w.normalize("\\\\host\\share\\a\\..\\..\\b"), "\\\\host\\share\\b");
        assert_eq!(w.normalize("\\\\host\\..\\x"), "\\\\host\\x");
        assert_eq!(w.normalize("C:"), "C:");
        assert_eq!(w.normalize("C:\\"), "C:\\");
        assert_eq!(w.normalize("C:a\\.\\b"), "C:a\\b");
    }

    #[test]
    fn test_join() {
        let p = posix();
        assert_eq!(p.join(&["/a", "", "b"]), "/a/b");
        assert_eq!(p.join(&["foo", "bar", "baz"]), "foo/bar/baz");
        assert_eq!(p.join(&["/foo", "bar", "baz"]), "/foo/bar/baz");
        assert_eq!(p.join(&["foo", "../bar"]), "bar");
        assert_eq!(p.join::<&str>(&[]), ".");
        assert_eq!(win32().join(&["C:\\a", "b/c"]), "C:\\a\\b\\c");
    }

    #[test]
    fn test_dirname() {
        let p = posix();
        assert_eq!(p.dirname("/a/b/c"), "/a/b");
        assert_eq!(p.dirname("/foo/bar/baz.txt"), "/foo/bar");
        assert_eq!(p.dirname("/foo/bar/"), "/foo");
        assert_eq!(p.dirname("/foo"), "/");
        assert_eq!(p.dirname("/"), "/");
        assert_eq!(p.dirname("foo"), ".");
        assert_eq!(p.dirname(""), ".");

        let w = win32();
        assert_eq!(w.dirname("C:\\a\\b"), "C:\\a");
        assert_eq!(w.dirname("C:\\a"), "C:\\");
        assert_eq!(w.dirname("C:\\"), "C:\\");
        assert_eq!(w.dirname("C:"), "C:");
        assert_eq!(w.dirname("C:a"), "C:");
        assert_eq!(w.dirname("\\\\host\\share\\f"), "\\\\host\\share");
    }

    #[test]
    fn test_basename() {
        let p = posix();
        assert_eq!(p.basename("/a/b/c.js", Some(".js")), "c");
        assert_eq!(p.basename("/foo/bar/baz.txt", None), "baz.txt");
        assert_eq!(p.basename("/foo/bar/", None), "bar");
        assert_eq!(p.basename("/", None), "");
        assert_eq!(p.basename("aaa/bbb", Some("bbb")), "bbb");
        assert_eq!(p.basename("file.js", Some(".ts")), "file.js");

        let w = win32();
        assert_eq!(w.basename("C:\\foo.txt", None), "foo.txt");
        assert_eq!(w.basename("C:/dir/file.js", Some(".js")), "file");
        assert_eq!(w.basename("C:\\", None), "");
        assert_eq!(w.basename("C:", None), "");
        assert_eq!(w.basename("C:foo", None), "foo");
    }

    #[test]
    fn test_extname() {
        let p = posix();
        assert_eq!(p.extname("file.tar.gz"), ".gz");
        assert_eq!(p.extname("file.txt"), ".txt");
        assert_eq!(p.extname("file"), "");
        assert_eq!(p.extname(".hidden"), "");
        assert_eq!(p.extname("/a.b/c"), "");
        assert_eq!(p.extname("/a/b.js/"), ".js");
        assert_eq!(p.extname("file."), ".");
        assert_eq!(p.extname(".."), "");
    }

    #[test]
    fn test_is_absolute() {
        let p = posix();
        assert!(p.is_absolute("/foo/bar"));
        assert!(!p.is_absolute("foo/bar"));
        assert!(!p.is_absolute("./foo"));
        assert!(!p.is_absolute(""));

        let w = win32();
        assert!(w.is_absolute("C:\\foo"));
        assert!(w.is_absolute("C:/foo"));
        assert!(w.is_absolute("\\foo"));
        assert!(w.is_absolute("\\\\host\\share"));
        assert!(!w.is_absolute("C:foo"));
        assert!(!w.is_absolute("C:"));
    }

    #[test]
    fn test_resolve() {
        let p = posix().with_cwd("/home/app");
        assert_eq!(p.resolve(&["/foo/bar", "./baz"]), "/foo/bar/baz");
        assert_eq!(p.resolve(&["/foo/bar", "/tmp/file/"]), "/tmp/file");
        assert_eq!(p.resolve(&["www", "static", "../img"]), "/home/app/www/img");
        assert_eq!(p.resolve(&["/"]), "/");
        assert_eq!(p.resolve::<&str>(&[]), "/home/app");

        let w = win32();
        assert_eq!(w.resolve(&["C:\\"]), "C:\\");
        assert_eq!(w.resolve(&["foo"]), "C:\\foo");
        assert_eq!(w.resolve(&["D:\\a", "b\\"]), "D:\\a\\b");
    }

    #[test]
    fn test_resolve_drive_relative() {
        let w = win32();
        assert_eq!(w.resolve(&["C:foo"]), "C:\\foo");
        assert_eq!(w.resolve(&["C:"]), "C:\\");
        assert_eq!(w.resolve(&["x", "C:foo", "y"]), "C:\\x\\foo\\y");
        assert_eq!(w.resolve(&["C:\\a", "c:b"]), "c:\\a\\b");
        assert_eq!(w.resolve(&["D:\\a", "C:b"]), "C:\\b");

        let on_d = win32().with_cwd("D:\\work");
        assert_eq!(on_d.resolve(&["d:foo"]), "d:\\work\\foo");
        assert_eq!(on_d.resolve(&["C:foo"]), "C:\\foo");
    }

    #[test]
    fn test_relative() {
        let p = posix();
        assert_eq!(p.relative("/a/b", "/a/c/d").unwrap(), "../c/d");
        assert_eq!(p.relative("/a/b", "/a/b").unwrap(), "");
        assert_eq!(p.relative("/a/b/c", "/a").unwrap(), "../..");
        assert_eq!(p.relative("/a", "/a/b").unwrap(), "b");
        assert_eq!(p.relative("/a/b", "/a/bc").unwrap(), "../bc");
        assert_eq!(p.relative("/", "/x/y").unwrap(), "x/y");

        let w = win32();
        assert_eq!(w.relative("C:\\a\\b", "C:\\a\\c").unwrap(), "..\\c");
    }

    #[test]
    fn test_relative_across_drives() {
        let err = win32().relative("C:\\a", "D:\\b").unwrap_err();
        assert!(matches!(err, PathError::AmbiguousRoot { .. }));
    }

    #[test]
    fn test_parse() {
        let parsed = posix().parse("/home/user/file.txt");
        assert_eq!(parsed.root, "/");
        assert_eq!(parsed.dir, "/home/user");
        assert_eq!(parsed.base, "file.txt");
        assert_eq!(parsed.ext, ".txt");
        assert_eq!(parsed.name, "file");

        let parsed = posix().parse("/a");
        assert_eq!(parsed.dir, "/");

        let parsed = win32().parse("C:\\dir\\file.js");
        assert_eq!(parsed.root, "C:\\");
        assert_eq!(parsed.dir, "C:\\dir");
        assert_eq!(parsed.name, "file");

        let parsed = win32().parse("C:file");
        assert_eq!(parsed.root, "C:");
        assert_eq!(parsed.dir, "C:");
        assert_eq!(parsed.base, "file");
    }

    #[test]
    fn test_format() {
        let p = posix();
        let components = PathComponents {
            root: "/ignored".into(),
            dir: "/home/user/dir".into(),
            base: "file.txt".into(),
            ..Default::default()
        };
        assert_eq!(p.format(&components), "/home/user/dir/file.txt");

        let components = PathComponents {
            root: "/".into(),
            name: "file".into(),
            ext: ".txt".into(),
            ..Default::default()
        };
        assert_eq!(p.format(&components), "/file.txt");
    }

    #[test]
    fn test_to_namespaced_path() {
        let w = win32();
        assert_eq!(w.to_namespaced_path("C:\\foo\\bar"), "\\\\?\\C:\\foo\\bar");
        assert_eq!(
            w.to_namespaced_path("\\\\host\\share\\f"),
            "\\\\?\\UNC\\host\\share\\f"
        );
        assert_eq!(w.to_namespaced_path("\\\\?\\C:\\x"), "\\\\?\\C:\\x");
        assert_eq!(w.to_namespaced_path(""), "");
        assert_eq!(posix().to_namespaced_path("/a/b"), "/a/b");
    }

    const POSIX_SAMPLES: &[&str] = &[
        "/a/b/c.js",
        "/a",
        "/",
        "a/b",
        "file.tar.gz",
        ".hidden",
        "/app/node_modules/pkg/index.json",
        "..",
        "../x/y",
        ".",
    ];

    const WIN32_SAMPLES: &[&str] = &[
        "C:\\a\\b.txt",
        "C:\\",
        "C:file",
        "\\top\\level",
        "\\\\host\\share\\f.md",
        "rel\\path",
    ];

    #[test]
    fn test_format_parse_round_trip() {
        for (api, samples) in [(posix(), POSIX_SAMPLES), (win32(), WIN32_SAMPLES)] {
            for sample in samples {
                let normalized = api.normalize(sample);
                assert_eq!(api.format(&api.parse(&normalized)), normalized, "{sample}");
            }
        }
    }

    #[test]
    fn test_normalize_idempotent() {
        let messy = ["a//b/./../c/", "/../..", "./", "x/../../y", "C:/a/../..", "//h/s/../t"];
        for (api, samples) in [(posix(), POSIX_SAMPLES), (win32(), WIN32_SAMPLES)] {
            for sample in samples.iter().chain(messy.iter()) {
                let once = api.normalize(sample);
                assert_eq!(api.normalize(&once), once, "{sample}");
            }
        }
    }

    #[test]
    fn test_join_associates_through_normalize() {
        let p = posix();
        let triples = [
            ("/a", "b", "c"),
            ("a", "..", ".."),
            ("", "", "c"),
            ("/x/", "/y", "../z"),
            ("a", "./b/", "c/"),
        ];
        for (a, b, c) in triples {
            assert_eq!(
                p.join(&[a, b, c]),
                p.normalize(&p.join(&[p.join(&[a, b]).as_str(), c])),
                "{a} {b} {c}"
            );
        }
    }

    #[test]
    fn test_resolve_is_absolute() {
        for (api, samples) in [(posix(), POSIX_SAMPLES), (win32(), WIN32_SAMPLES)] {
            for sample in samples {
                assert!(api.is_absolute(&api.resolve(&[sample])), "{sample}");
                assert!(api.is_absolute(&api.resolve(&["x", sample, "y"])), "{sample}");
            }
        }
    }

    #[test]
    fn test_relative_inverse() {
        let p = posix();
        let absolute = ["/", "/a", "/a/b", "/a/b/c", "/a/c/d", "/app/node_modules/x"];
        for from in absolute {
            for to in absolute {
                let rel = p.relative(from, to).unwrap();
                assert_eq!(p.normalize(&p.join(&[from, rel.as_str()])), p.normalize(to));
            }
        }
    }
}
